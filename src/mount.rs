// ============================================================================
// src/mount.rs – temporary read-only mount of the alternate partition
// ============================================================================

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::host::Host;

/// A read-only mount at a scratch directory. Dropping it unmounts and removes
/// the directory, whichever way the caller leaves.
pub struct ScratchMount<'a> {
    host: &'a dyn Host,
    path: PathBuf,
    mounted: bool,
}

impl<'a> ScratchMount<'a> {
    pub fn read_only(host: &'a dyn Host, device: &str, path: PathBuf) -> Result<Self> {
        host.create_dir_all(&path)
            .with_context(|| format!("create mount point {}", path.display()))?;

        let mut guard = Self {
            host,
            path,
            mounted: false,
        };
        let target = guard.path.to_string_lossy().into_owned();
        host.run_stdout("mount", &["-o", "ro", device, target.as_str()])
            .with_context(|| format!("mount {} at {}", device, target))?;
        guard.mounted = true;
        debug!("mounted {} read-only at {}", device, target);
        Ok(guard)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchMount<'_> {
    fn drop(&mut self) {
        let target = self.path.to_string_lossy().into_owned();
        if self.mounted {
            if let Err(err) = self.host.run_stdout("umount", &[target.as_str()]) {
                // Never recurse into a directory that is still a mount.
                warn!("umount {} failed, leaving mount point: {:#}", target, err);
                return;
            }
        }
        if let Err(err) = self.host.remove_dir_all(&self.path) {
            debug!("remove {}: {}", target, err);
        }
    }
}
