// ============================================================================
// src/cmd/reset.rs – forget the simulated next-boot choice
// ============================================================================

use anyhow::{Context, Result};
use tracing::debug;

use crate::dry_run::DryRunStore;
use crate::ui::UX;

pub fn run_reset(ui: &UX, store: &DryRunStore) -> Result<()> {
    let removed = store
        .reset()
        .with_context(|| format!("failed to remove {}", store.marker().display()))?;
    debug!("dry-run marker removed: {}", removed);
    ui.info("Reset dry run state to defaults");
    Ok(())
}
