// ============================================================================
// src/cmd/show.rs – print the partition overview and exit
// ============================================================================

use crate::state::SystemInfo;
use crate::ui::UX;

pub fn run_show(ui: &UX, info: &SystemInfo) {
    ui.overview(info);
}
