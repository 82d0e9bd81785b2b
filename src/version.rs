// ============================================================================
// src/version.rs – OS version labels and dotted-numeric comparison
// ============================================================================

use std::cmp::Ordering;
use std::path::Path;
use tracing::debug;

use crate::error::BootError;
use crate::host::Host;

/// Reported when a partition's label cannot be read.
pub const UNKNOWN_VERSION: &str = "unknown";

/// First release whose firmware manages the next boot through the mmc
/// boot-partition register instead of the `root_part` attribute.
pub const MMC_BOOT_GATE: &str = "3.22";

/// Label files relative to a filesystem root, tried in order.
const LABEL_SOURCES: &[(&str, &str)] = &[
    ("usr/share/remarkable/update.conf", "RELEASE_VERSION="),
    ("etc/os-release", "IMG_VERSION="),
];

/// Compare two dotted version strings numerically, component by component.
/// Missing components count as 0, as do components that are not numbers.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let left: Vec<&str> = a.split('.').collect();
    let right: Vec<&str> = b.split('.').collect();
    let len = left.len().max(right.len());

    for i in 0..len {
        let l = component(&left, i);
        let r = component(&right, i);
        match l.cmp(&r) {
            Ordering::Equal => continue,
            unequal => return unequal,
        }
    }
    Ordering::Equal
}

fn component(parts: &[&str], idx: usize) -> u64 {
    parts
        .get(idx)
        .and_then(|p| p.parse().ok())
        .unwrap_or(0)
}

/// True when `version` is at or above the mmc boot gate.
pub fn uses_mmc_boot(version: &str) -> bool {
    compare_versions(version, MMC_BOOT_GATE) != Ordering::Less
}

/// Extract the value following `key` on the first line containing it.
fn find_label(content: &str, key: &str) -> Option<String> {
    content.lines().find_map(|line| {
        line.find(key)
            .map(|idx| line[idx + key.len()..].trim_matches('"').to_string())
    })
}

/// Read the version label of the filesystem mounted at `root`.
pub fn read_version(host: &dyn Host, root: &Path) -> Result<String, BootError> {
    for (rel, key) in LABEL_SOURCES {
        let path = root.join(rel);
        match host.read_to_string(&path) {
            Ok(content) => {
                if let Some(version) = find_label(&content, key) {
                    debug!("version {} from {}", version, path.display());
                    return Ok(version);
                }
                debug!("{} has no {} line", path.display(), key);
            }
            Err(err) => debug!("cannot read {}: {}", path.display(), err),
        }
    }
    Err(BootError::VersionUnknown(root.to_path_buf()))
}
