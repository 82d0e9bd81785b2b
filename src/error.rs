// ============================================================================
// src/error.rs – error kinds surfaced by partition resolution and switching
// ============================================================================

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BootError {
    /// Running or next-boot partition could not be determined. Fatal for a snapshot.
    #[error("unable to resolve partition state: {0}")]
    Resolution(String),

    /// Neither label file under the root carried a version key.
    #[error("no version label found under {}", .0.display())]
    VersionUnknown(PathBuf),

    /// A firmware, sysfs or mmc write failed. Earlier steps are not reverted.
    #[error("boot switch failed at `{step}`: {detail}")]
    Switch { step: String, detail: String },

    #[error("invalid partition number {0} (expected 2 or 3)")]
    InvalidPartitionNumber(u32),
}

impl BootError {
    pub fn resolution(msg: impl Into<String>) -> Self {
        BootError::Resolution(msg.into())
    }

    pub fn switch(step: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        BootError::Switch {
            step: step.into(),
            detail: detail.to_string(),
        }
    }
}
