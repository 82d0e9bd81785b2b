// ============================================================================
// src/cmd/interactive.rs – pick the next boot partition, then offer a reboot
// ============================================================================

use anyhow::{Context, Result};
use tracing::info;

use crate::menu;
use crate::partition::Partition;
use crate::session::Session;
use crate::state::{BootBackend, SystemInfo};
use crate::switch::{SwitchMechanism, SwitchOutcome};
use crate::ui::UX;
use crate::util::privilege::is_root;

/// Prompt-driven flow over a session that has already been resolved and
/// shown. Declining the first question leaves everything untouched.
pub fn run_interactive<B: BootBackend + ?Sized>(
    ui: &UX,
    session: &mut Session<'_, B>,
    info: &SystemInfo,
) -> Result<()> {
    if !menu::confirm("Change next boot partition?")? {
        return Ok(());
    }
    let target = menu::select_partition(info)?;

    let updated = match apply_selection(ui, session, info, target)? {
        Some(updated) => updated,
        None => return Ok(()),
    };

    let reboot = menu::confirm("Reboot now?")?;
    finish(ui, session, &updated, target, reboot)
}

/// Switch to `target` unless it already boots next. Returns the refreshed
/// snapshot after a switch.
pub fn apply_selection<B: BootBackend + ?Sized>(
    ui: &UX,
    session: &mut Session<'_, B>,
    info: &SystemInfo,
    target: Partition,
) -> Result<Option<SystemInfo>> {
    if target == info.next_boot {
        ui.info(&format!(
            "No changes needed. Partition {} is already set to boot next.",
            target
        ));
        return Ok(None);
    }

    let dry_run = session.backend().is_dry_run();
    let version = info.version_of(target).to_string();
    if dry_run {
        ui.info(&format!(
            "[DRY RUN] Setting next boot to version {} (partition {})",
            version, target
        ));
    } else {
        if !is_root() {
            ui.warn("Not running as root; the boot switch will likely be refused.");
        }
        ui.info(&format!(
            "Setting next boot to version {} (partition {})...",
            version, target
        ));
    }

    let outcome = session
        .switch_to(target)
        .with_context(|| format!("failed to switch next boot to partition {}", target))?;
    info!("next boot set to partition {}", target);
    let mut lines = outcome_lines(&outcome, &version, target).into_iter();
    if let Some(headline) = lines.next() {
        ui.success(&headline);
    }
    for line in lines {
        ui.note(&line);
    }

    let updated = session
        .resolve()
        .context("failed to refresh system info")?
        .clone();
    ui.overview(&updated);
    Ok(Some(updated))
}

/// What to tell the user after a successful switch.
pub fn outcome_lines(outcome: &SwitchOutcome, version: &str, target: Partition) -> Vec<String> {
    match outcome {
        SwitchOutcome::DryRun { marker } => vec![
            format!("Saved boot partition {} to {}", target, marker.display()),
            "Run again to see the updated boot configuration.".to_string(),
        ],
        SwitchOutcome::Applied(SwitchMechanism::UbootEnv) => vec![
            format!(
                "Successfully set next boot to version {} (partition {})",
                version, target
            ),
            "Reboot to boot into the selected partition.".to_string(),
        ],
        SwitchOutcome::Applied(mechanism) => vec![format!(
            "Successfully set next boot to version {} (partition {}) using {}",
            version, target, mechanism
        )],
    }
}

/// Reboot on request, otherwise say when the new version takes over.
pub fn finish<B: BootBackend + ?Sized>(
    ui: &UX,
    session: &mut Session<'_, B>,
    info: &SystemInfo,
    target: Partition,
    reboot: bool,
) -> Result<()> {
    let version = info.version_of(target);
    if !reboot {
        ui.info(&format!(
            "Version will switch to {} at the next reboot.",
            version
        ));
        return Ok(());
    }

    if session.backend().is_dry_run() {
        ui.info(&format!("[DRY RUN] Would reboot now to version {}", version));
    } else {
        ui.info(&format!("Rebooting now to version {}...", version));
    }
    session.reboot()
}
