// ============================================================================
// src/state.rs – boot state snapshot and the live device backend
// ============================================================================

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::config::Paths;
use crate::device::{classify, DeviceFamily};
use crate::error::BootError;
use crate::host::Host;
use crate::mount::ScratchMount;
use crate::partition::{sibling_device, Partition};
use crate::resolver::{resolve, Resolution};
use crate::switch::{self, SwitchOutcome, SwitchRequest};
use crate::version::{read_version, UNKNOWN_VERSION};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionInfo {
    pub number: Partition,
    pub version: String,
    pub is_active: bool,
    pub is_next_boot: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInfo {
    pub active: PartitionInfo,
    pub fallback: PartitionInfo,
    pub next_boot: Partition,
    pub family: DeviceFamily,
}

impl SystemInfo {
    /// Build a snapshot from the running partition; the fallback is its complement.
    pub fn assemble(
        family: DeviceFamily,
        running: Partition,
        next_boot: Partition,
        active_version: String,
        fallback_version: String,
    ) -> Self {
        let fallback = running.other();
        Self {
            active: PartitionInfo {
                number: running,
                version: active_version,
                is_active: true,
                is_next_boot: next_boot == running,
            },
            fallback: PartitionInfo {
                number: fallback,
                version: fallback_version,
                is_active: false,
                is_next_boot: next_boot == fallback,
            },
            next_boot,
            family,
        }
    }

    pub fn partition(&self, p: Partition) -> &PartitionInfo {
        if self.active.number == p {
            &self.active
        } else {
            &self.fallback
        }
    }

    pub fn version_of(&self, p: Partition) -> &str {
        &self.partition(p).version
    }

    /// Slot A (partition 2) first, then slot B.
    pub fn slots(&self) -> [&PartitionInfo; 2] {
        Partition::ALL.map(|p| self.partition(p))
    }

    pub fn is_consistent(&self) -> bool {
        self.active.number != self.fallback.number
            && self.active.is_active
            && !self.fallback.is_active
            && (self.active.is_next_boot != self.fallback.is_next_boot)
            && self.active.is_next_boot == (self.next_boot == self.active.number)
            && self.fallback.is_next_boot == (self.next_boot == self.fallback.number)
    }
}

/// Source of boot state and sink for boot switches: the real device or the
/// dry-run store.
pub trait BootBackend {
    fn snapshot(&self) -> Result<SystemInfo, BootError>;
    fn switch_boot(&self, target: Partition, current: &SystemInfo)
        -> Result<SwitchOutcome, BootError>;
    fn reboot(&self) -> Result<()>;

    fn is_dry_run(&self) -> bool {
        false
    }
}

/// The running tablet, reached through a [`Host`].
pub struct Device<H: Host> {
    host: H,
    paths: Paths,
}

impl<H: Host> Device<H> {
    pub fn new(host: H, paths: Paths) -> Self {
        Self { host, paths }
    }

    fn active_version(&self) -> String {
        read_version(&self.host, &self.paths.live_root).unwrap_or_else(|err| {
            debug!("{}", err);
            UNKNOWN_VERSION.to_string()
        })
    }

    /// Mount the alternate partition read-only and read its label.
    fn alternate_version(&self, resolution: &Resolution) -> String {
        let device = match sibling_device(&resolution.running_device, resolution.other) {
            Ok(device) => device,
            Err(err) => {
                warn!("{}", err);
                return UNKNOWN_VERSION.to_string();
            }
        };
        let mount_point = self
            .paths
            .scratch_dir
            .join(format!("mount_p{}", resolution.other.number()));

        let mount = match ScratchMount::read_only(&self.host, &device, mount_point) {
            Ok(mount) => mount,
            Err(err) => {
                warn!("failed to mount partition {}: {:#}", resolution.other, err);
                return UNKNOWN_VERSION.to_string();
            }
        };
        read_version(&self.host, mount.path()).unwrap_or_else(|err| {
            debug!("{}", err);
            UNKNOWN_VERSION.to_string()
        })
    }
}

impl<H: Host> BootBackend for Device<H> {
    fn snapshot(&self) -> Result<SystemInfo, BootError> {
        let family = classify(&self.host, &self.paths.device_model);
        let resolution = resolve(&self.host, family, &self.paths)?;

        let info = SystemInfo::assemble(
            family,
            resolution.running,
            resolution.next_boot,
            self.active_version(),
            self.alternate_version(&resolution),
        );
        debug!(
            "SystemInfo: running={} other={} next_boot={} family={}",
            resolution.running, resolution.other, resolution.next_boot, family
        );
        debug!(
            "Active: number={} version={} next_boot={}",
            info.active.number, info.active.version, info.active.is_next_boot
        );
        debug!(
            "Fallback: number={} version={} next_boot={}",
            info.fallback.number, info.fallback.version, info.fallback.is_next_boot
        );
        debug_assert!(info.is_consistent());
        Ok(info)
    }

    fn switch_boot(
        &self,
        target: Partition,
        current: &SystemInfo,
    ) -> Result<SwitchOutcome, BootError> {
        let request = SwitchRequest::from_snapshot(current, target);
        switch::switch_boot(&self.host, &self.paths, &request).map(SwitchOutcome::Applied)
    }

    fn reboot(&self) -> Result<()> {
        self.host
            .run_stdout("reboot", &[])
            .context("failed to reboot")?;
        Ok(())
    }
}
