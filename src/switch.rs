// ============================================================================
// src/switch.rs – make a partition the next boot target
// ============================================================================

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::config::Paths;
use crate::device::DeviceFamily;
use crate::error::BootError;
use crate::host::Host;
use crate::partition::Partition;
use crate::state::SystemInfo;
use crate::version::{uses_mmc_boot, MMC_BOOT_GATE, UNKNOWN_VERSION};

/// How the next boot target is recorded on the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwitchMechanism {
    /// u-boot environment via `fw_setenv` (Legacy and Standard).
    UbootEnv,
    /// eMMC boot-partition register via `mmc bootpart enable` (NextGen).
    MmcBootPart,
    /// Letter written to the `root_part` sysfs attribute (NextGen before 3.22).
    SysfsRootPart,
}

impl fmt::Display for SwitchMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SwitchMechanism::UbootEnv => "fw_setenv",
            SwitchMechanism::MmcBootPart => "mmc bootpart",
            SwitchMechanism::SysfsRootPart => "root_part sysfs",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SwitchOutcome {
    Applied(SwitchMechanism),
    DryRun { marker: PathBuf },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwitchRequest<'a> {
    pub family: DeviceFamily,
    pub target: Partition,
    /// Recorded as the fallback by the u-boot sequence.
    pub previous: Partition,
    pub running_version: &'a str,
    pub target_version: &'a str,
}

impl<'a> SwitchRequest<'a> {
    pub fn from_snapshot(info: &'a SystemInfo, target: Partition) -> Self {
        Self {
            family: info.family,
            target,
            previous: info.next_boot,
            running_version: &info.active.version,
            target_version: info.version_of(target),
        }
    }
}

/// Pick the mechanism for a family. On NextGen the mmc register is used when
/// either side of the switch is 3.22 or newer: running 3.22+ firmware denies
/// writes to `root_part`, and a 3.22+ target only boots from the register.
pub fn select_mechanism(
    family: DeviceFamily,
    running_version: &str,
    target_version: &str,
) -> SwitchMechanism {
    if family.uses_uboot_env() {
        return SwitchMechanism::UbootEnv;
    }
    let running = if running_version == UNKNOWN_VERSION {
        MMC_BOOT_GATE
    } else {
        running_version
    };
    if uses_mmc_boot(running) || uses_mmc_boot(target_version) {
        SwitchMechanism::MmcBootPart
    } else {
        SwitchMechanism::SysfsRootPart
    }
}

/// The u-boot environment writes, in the order they must be applied.
pub fn uboot_env_sequence(target: Partition, previous: Partition) -> [(&'static str, String); 4] {
    [
        ("upgrade_available", "1".to_string()),
        ("bootcount", "0".to_string()),
        ("fallback_partition", previous.number().to_string()),
        ("active_partition", target.number().to_string()),
    ]
}

pub fn switch_boot(
    host: &dyn Host,
    paths: &Paths,
    request: &SwitchRequest<'_>,
) -> Result<SwitchMechanism, BootError> {
    let mechanism = select_mechanism(
        request.family,
        request.running_version,
        request.target_version,
    );
    info!(
        "switching next boot to partition {} ({}) via {}",
        request.target, request.target_version, mechanism
    );

    match mechanism {
        SwitchMechanism::UbootEnv => write_uboot_env(host, request.target, request.previous)?,
        SwitchMechanism::MmcBootPart => enable_mmc_bootpart(host, request.target)?,
        SwitchMechanism::SysfsRootPart => write_root_part(host, &paths.root_part, request.target)?,
    }
    Ok(mechanism)
}

/// Apply the four environment writes, stopping at the first failure.
/// Writes already applied stay applied.
fn write_uboot_env(host: &dyn Host, target: Partition, previous: Partition) -> Result<(), BootError> {
    for (key, value) in uboot_env_sequence(target, previous) {
        let step = format!("fw_setenv {} {}", key, value);
        debug!("Running: {}", step);
        if let Err(err) = host.run_stdout("fw_setenv", &[key, value.as_str()]) {
            error!("Command failed: {}: {:#}", step, err);
            return Err(BootError::switch(step, format!("{:#}", err)));
        }
        debug!("✓ Success");
    }
    Ok(())
}

fn enable_mmc_bootpart(host: &dyn Host, target: Partition) -> Result<(), BootError> {
    let args = target.mmc_bootpart_args();
    let step = format!("mmc {}", args.join(" "));
    debug!("Running: {}", step);
    host.run_stdout("mmc", &args)
        .map_err(|err| BootError::switch(step, format!("{:#}", err)))?;
    Ok(())
}

fn write_root_part(host: &dyn Host, path: &Path, target: Partition) -> Result<(), BootError> {
    let letter = target.root_part_letter();
    debug!("writing {:?} to {}", letter, path.display());
    host.write(path, letter)
        .map_err(|err| BootError::switch(format!("write {}", path.display()), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::fake::FakeHost;

    const ROOT_PART: &str = "/sys/devices/platform/lpgpr/root_part";

    fn request<'a>(
        family: DeviceFamily,
        target: Partition,
        running_version: &'a str,
        target_version: &'a str,
    ) -> SwitchRequest<'a> {
        SwitchRequest {
            family,
            target,
            previous: target.other(),
            running_version,
            target_version,
        }
    }

    #[test]
    fn next_gen_mechanism_is_version_gated() {
        let ng = DeviceFamily::NextGen;
        assert_eq!(select_mechanism(ng, "3.21", "3.23"), SwitchMechanism::MmcBootPart);
        assert_eq!(select_mechanism(ng, "3.25", "3.19"), SwitchMechanism::MmcBootPart);
        assert_eq!(select_mechanism(ng, "3.19", "3.20"), SwitchMechanism::SysfsRootPart);
        assert_eq!(select_mechanism(ng, "3.22", "3.22"), SwitchMechanism::MmcBootPart);
    }

    #[test]
    fn unknown_running_version_prefers_mmc() {
        assert_eq!(
            select_mechanism(DeviceFamily::NextGen, UNKNOWN_VERSION, "3.20"),
            SwitchMechanism::MmcBootPart
        );
        assert_eq!(
            select_mechanism(DeviceFamily::NextGen, "3.20", UNKNOWN_VERSION),
            SwitchMechanism::SysfsRootPart
        );
    }

    #[test]
    fn older_families_always_use_uboot_env() {
        for family in [DeviceFamily::Legacy, DeviceFamily::Standard] {
            assert_eq!(select_mechanism(family, "3.25", "3.30"), SwitchMechanism::UbootEnv);
        }
    }

    #[test]
    fn uboot_sequence_order() {
        let host = FakeHost::new();
        let req = SwitchRequest {
            family: DeviceFamily::Standard,
            target: Partition::RootB,
            previous: Partition::RootA,
            running_version: "3.20.0.92",
            target_version: "3.18.2.3",
        };
        let mechanism = switch_boot(&host, &Paths::default(), &req).unwrap();

        assert_eq!(mechanism, SwitchMechanism::UbootEnv);
        assert_eq!(
            host.commands(),
            vec![
                "fw_setenv upgrade_available 1",
                "fw_setenv bootcount 0",
                "fw_setenv fallback_partition 2",
                "fw_setenv active_partition 3",
            ]
        );
    }

    #[test]
    fn uboot_failure_stops_later_steps() {
        let host = FakeHost::new().with_failure(
            "fw_setenv fallback_partition 3",
            1,
            "Cannot access MTD device",
        );
        let req = SwitchRequest {
            family: DeviceFamily::Legacy,
            target: Partition::RootA,
            previous: Partition::RootB,
            running_version: "2.15",
            target_version: "2.14",
        };
        let err = switch_boot(&host, &Paths::default(), &req).unwrap_err();

        match err {
            BootError::Switch { step, detail } => {
                assert_eq!(step, "fw_setenv fallback_partition 3");
                assert!(detail.contains("Cannot access MTD device"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            host.commands(),
            vec![
                "fw_setenv upgrade_available 1",
                "fw_setenv bootcount 0",
                "fw_setenv fallback_partition 3",
            ]
        );
    }

    #[test]
    fn mmc_register_mapping() {
        let host = FakeHost::new();
        let req = request(DeviceFamily::NextGen, Partition::RootA, "3.22.0.64", "3.20");
        switch_boot(&host, &Paths::default(), &req).unwrap();
        assert_eq!(host.commands(), vec!["mmc bootpart enable 1 0 /dev/mmcblk0boot0"]);

        let host = FakeHost::new();
        let req = request(DeviceFamily::NextGen, Partition::RootB, "3.21", "3.23");
        switch_boot(&host, &Paths::default(), &req).unwrap();
        assert_eq!(host.commands(), vec!["mmc bootpart enable 2 0 /dev/mmcblk0boot1"]);
        assert!(host.file(ROOT_PART).is_none());
    }

    #[test]
    fn mmc_failure_is_switch_error() {
        let host = FakeHost::new().without_tool("mmc");
        let req = request(DeviceFamily::NextGen, Partition::RootB, "3.22", "3.22");
        assert!(matches!(
            switch_boot(&host, &Paths::default(), &req),
            Err(BootError::Switch { .. })
        ));
    }

    #[test]
    fn sysfs_letter_mapping() {
        let host = FakeHost::new();
        let req = request(DeviceFamily::NextGen, Partition::RootB, "3.19", "3.20");
        let mechanism = switch_boot(&host, &Paths::default(), &req).unwrap();
        assert_eq!(mechanism, SwitchMechanism::SysfsRootPart);
        assert_eq!(host.file(ROOT_PART).as_deref(), Some("b"));
        assert!(host.commands().is_empty());

        let req = request(DeviceFamily::NextGen, Partition::RootA, "3.19", "3.20");
        switch_boot(&host, &Paths::default(), &req).unwrap();
        assert_eq!(host.file(ROOT_PART).as_deref(), Some("a"));
    }

    #[test]
    fn denied_sysfs_write_is_switch_error() {
        let host = FakeHost::new().deny_write(ROOT_PART);
        let req = request(DeviceFamily::NextGen, Partition::RootA, "3.18", "3.19");
        let err = switch_boot(&host, &Paths::default(), &req).unwrap_err();
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn request_from_snapshot() {
        let info = SystemInfo::assemble(
            DeviceFamily::NextGen,
            Partition::RootA,
            Partition::RootA,
            "3.21.0.1".into(),
            "3.22.0.64".into(),
        );
        let req = SwitchRequest::from_snapshot(&info, Partition::RootB);
        assert_eq!(req.previous, Partition::RootA);
        assert_eq!(req.running_version, "3.21.0.1");
        assert_eq!(req.target_version, "3.22.0.64");
    }
}
