// ============================================================================
// src/resolver.rs – running / alternate / next-boot partition resolution
// ============================================================================

use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

use crate::config::Paths;
use crate::device::DeviceFamily;
use crate::error::BootError;
use crate::host::Host;
use crate::partition::{partition_number_from_device, Partition};
use crate::version::{read_version, uses_mmc_boot};

/// Assumed running version when a NextGen root carries no label.
const UNLABELLED_NEXT_GEN_VERSION: &str = "3.20";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub running: Partition,
    pub other: Partition,
    pub next_boot: Partition,
    /// Block device of the running root, e.g. `/dev/mmcblk2p2`.
    pub running_device: String,
}

pub fn resolve(host: &dyn Host, family: DeviceFamily, paths: &Paths) -> Result<Resolution, BootError> {
    let resolution = match family {
        DeviceFamily::NextGen => resolve_next_gen(host, paths)?,
        DeviceFamily::Legacy | DeviceFamily::Standard => resolve_uboot(host)?,
    };
    debug!(
        "resolved running={} other={} next_boot={} ({})",
        resolution.running, resolution.other, resolution.next_boot, resolution.running_device
    );
    Ok(resolution)
}

/// Ask `tool` for the running root device and parse its partition number.
fn running_partition(
    host: &dyn Host,
    tool: &str,
    args: &[&str],
) -> Result<(String, Partition), BootError> {
    let device = host
        .run_stdout(tool, args)
        .map_err(|e| BootError::resolution(format!("failed to get root device: {:#}", e)))?;
    let number = partition_number_from_device(&device)?;
    let partition = Partition::from_number(number).map_err(|_| {
        BootError::resolution(format!("unexpected partition number {} on {}", number, device))
    })?;
    Ok((device, partition))
}

fn resolve_uboot(host: &dyn Host) -> Result<Resolution, BootError> {
    let (running_device, running) = running_partition(host, "rootdev", &[])?;

    let next_boot = match host.run_stdout("fw_printenv", &["active_partition"]) {
        Ok(line) => parse_env_partition(&line).unwrap_or_else(|| {
            debug!("unusable active_partition {:?}; assuming running partition", line);
            running
        }),
        Err(err) => {
            debug!("fw_printenv active_partition: {:#}; assuming running partition", err);
            running
        }
    };

    Ok(Resolution {
        running,
        other: running.other(),
        next_boot,
        running_device,
    })
}

/// Parse `active_partition=<N>` as printed by `fw_printenv`.
pub fn parse_env_partition(line: &str) -> Option<Partition> {
    let (_, value) = line.trim().split_once('=')?;
    if value.contains('=') {
        return None;
    }
    let number: u32 = value.parse().ok()?;
    Partition::from_number(number).ok()
}

fn resolve_next_gen(host: &dyn Host, paths: &Paths) -> Result<Resolution, BootError> {
    let (running_device, running) = running_partition(host, "swupdate", &["-g"])?;

    let current_version = read_version(host, &paths.live_root).unwrap_or_else(|err| {
        debug!("{}; assuming {}", err, UNLABELLED_NEXT_GEN_VERSION);
        UNLABELLED_NEXT_GEN_VERSION.to_string()
    });

    let next_boot = next_gen_next_boot(host, paths, &current_version).unwrap_or_else(|err| {
        warn!("{}; assuming next boot is the running partition", err);
        running
    });

    Ok(Resolution {
        running,
        other: running.other(),
        next_boot,
        running_device,
    })
}

/// Read the NextGen next-boot attribute appropriate for `current_version`.
pub fn next_gen_next_boot(
    host: &dyn Host,
    paths: &Paths,
    current_version: &str,
) -> Result<Partition, BootError> {
    if uses_mmc_boot(current_version) {
        match host.read_to_string(&paths.boot_part) {
            Ok(raw) => {
                let value = raw.trim();
                return Partition::from_boot_part_value(value).ok_or_else(|| {
                    BootError::resolution(format!("unexpected boot_part value: {}", value))
                });
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("{} absent; reading root_part", paths.boot_part.display());
            }
            Err(err) => {
                return Err(BootError::resolution(format!(
                    "failed to read boot_part: {}",
                    err
                )))
            }
        }
    }
    read_root_part(host, &paths.root_part)
}

fn read_root_part(host: &dyn Host, path: &Path) -> Result<Partition, BootError> {
    let raw = host
        .read_to_string(path)
        .map_err(|e| BootError::resolution(format!("failed to read root_part: {}", e)))?;
    let value = raw.trim();
    Partition::from_root_part_letter(value)
        .ok_or_else(|| BootError::resolution(format!("unexpected root_part value: {}", value)))
}
