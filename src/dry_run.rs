// ============================================================================
// src/dry_run.rs – file-backed stand-in for the device
// ============================================================================

use anyhow::Result;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::device::DeviceFamily;
use crate::error::BootError;
use crate::partition::Partition;
use crate::state::{BootBackend, SystemInfo};
use crate::switch::SwitchOutcome;

pub const DRY_RUN_ACTIVE_VERSION: &str = "3.20.0.92";
pub const DRY_RUN_FALLBACK_VERSION: &str = "3.18.2.3";

/// The simulated device always runs from partition 3.
const DRY_RUN_ACTIVE: Partition = Partition::RootB;
const DEFAULT_NEXT_BOOT: Partition = Partition::RootB;

/// Persists only the selected next-boot partition, as a single digit.
#[derive(Debug, Clone)]
pub struct DryRunStore {
    marker: PathBuf,
}

impl DryRunStore {
    pub fn new(marker: impl Into<PathBuf>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn marker(&self) -> &Path {
        &self.marker
    }

    /// Stored next-boot partition; a missing or unusable marker means partition 3.
    pub fn stored_next_boot(&self) -> Partition {
        let raw = match fs::read_to_string(&self.marker) {
            Ok(raw) => raw,
            Err(_) => return DEFAULT_NEXT_BOOT,
        };
        raw.trim()
            .parse::<u32>()
            .ok()
            .and_then(|n| Partition::from_number(n).ok())
            .unwrap_or_else(|| {
                debug!("ignoring marker content {:?}", raw.trim());
                DEFAULT_NEXT_BOOT
            })
    }

    pub fn save(&self, partition: Partition) -> Result<(), BootError> {
        fs::write(&self.marker, partition.number().to_string())
            .map_err(|err| BootError::switch(format!("write {}", self.marker.display()), err))?;
        debug!("saved partition {} to {}", partition, self.marker.display());
        Ok(())
    }

    /// Remove the marker. Returns false when there was nothing to remove.
    pub fn reset(&self) -> io::Result<bool> {
        match fs::remove_file(&self.marker) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }
}

impl BootBackend for DryRunStore {
    fn snapshot(&self) -> Result<SystemInfo, BootError> {
        Ok(SystemInfo::assemble(
            DeviceFamily::Standard,
            DRY_RUN_ACTIVE,
            self.stored_next_boot(),
            DRY_RUN_ACTIVE_VERSION.to_string(),
            DRY_RUN_FALLBACK_VERSION.to_string(),
        ))
    }

    fn switch_boot(
        &self,
        target: Partition,
        _current: &SystemInfo,
    ) -> Result<SwitchOutcome, BootError> {
        self.save(target)?;
        Ok(SwitchOutcome::DryRun {
            marker: self.marker.clone(),
        })
    }

    fn reboot(&self) -> Result<()> {
        info!("dry run: reboot skipped");
        Ok(())
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &Path) -> DryRunStore {
        DryRunStore::new(dir.join("dry-run-boot.txt"))
    }

    #[test]
    fn defaults_without_marker() {
        let dir = tempdir().unwrap();
        let info = store_in(dir.path()).snapshot().unwrap();

        assert_eq!(info.active.number, Partition::RootB);
        assert_eq!(info.active.version, "3.20.0.92");
        assert_eq!(info.fallback.number, Partition::RootA);
        assert_eq!(info.fallback.version, "3.18.2.3");
        assert_eq!(info.next_boot, Partition::RootB);
        assert!(info.active.is_next_boot);
        assert!(info.is_consistent());
    }

    #[test]
    fn saved_partition_round_trips() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        store.save(Partition::RootA).unwrap();
        assert_eq!(fs::read_to_string(store.marker()).unwrap(), "2");
        let info = store.snapshot().unwrap();
        assert_eq!(info.next_boot, Partition::RootA);
        assert!(info.fallback.is_next_boot);
        assert!(!info.active.is_next_boot);

        store.save(Partition::RootB).unwrap();
        assert_eq!(fs::read_to_string(store.marker()).unwrap(), "3");
        let info = store.snapshot().unwrap();
        assert_eq!(info.next_boot, Partition::RootB);
        assert!(!info.fallback.is_next_boot);
        assert!(info.active.is_next_boot);
    }

    #[test]
    fn malformed_marker_defaults_to_three() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        for content in ["invalid", "5", "", "2 3"] {
            fs::write(store.marker(), content).unwrap();
            assert_eq!(
                store.snapshot().unwrap().next_boot,
                Partition::RootB,
                "for {content:?}"
            );
        }
    }

    #[test]
    fn marker_with_newline_is_accepted() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        fs::write(store.marker(), "2\n").unwrap();
        assert_eq!(store.stored_next_boot(), Partition::RootA);
    }

    #[test]
    fn switch_boot_writes_marker() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let before = store.snapshot().unwrap();

        let outcome = store.switch_boot(Partition::RootA, &before).unwrap();
        assert_eq!(
            outcome,
            SwitchOutcome::DryRun {
                marker: store.marker().to_path_buf()
            }
        );
        assert_eq!(store.snapshot().unwrap().next_boot, Partition::RootA);
        assert!(store.is_dry_run());
    }

    #[test]
    fn unwritable_marker_is_switch_error() {
        let dir = tempdir().unwrap();
        let store = DryRunStore::new(dir.path().join("missing").join("marker.txt"));
        assert!(matches!(
            store.save(Partition::RootA),
            Err(BootError::Switch { .. })
        ));
    }

    #[test]
    fn reset_removes_marker() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        assert!(!store.reset().unwrap());
        store.save(Partition::RootA).unwrap();
        assert!(store.reset().unwrap());
        assert!(!store.marker().exists());
        assert_eq!(store.stored_next_boot(), Partition::RootB);
    }
}
