// ============================================================================
// src/cmd/mod.rs – command subsystem root
// ============================================================================
pub mod base; // allowlisted process execution (Cmd, OutputData)
pub mod interactive; // change next boot, then offer a reboot
pub mod reset; // --reset-dry-run
pub mod show; // --show-only

// Re-export common types for convenience:
pub use base::{Cmd, OutputData};
