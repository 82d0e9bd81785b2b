// ============================================================================
// src/cmd/base.rs – Allowlisted external command runner (for device utilities)
// ============================================================================

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// Tools the switcher is permitted to spawn.
const ALLOWED_TOOLS: &[&str] = &[
    // partition discovery
    "rootdev",
    "swupdate",
    // u-boot environment
    "fw_printenv",
    "fw_setenv",
    // eMMC boot partition register
    "mmc",
    // scratch mounts for reading the alternate partition
    "mount",
    "umount",
    "reboot",
];

/// Directories searched, in order, when resolving a tool name.
const SEARCH_DIRS: &[&str] = &["/usr/sbin", "/sbin", "/usr/bin", "/bin", "/usr/local/bin"];

/// Safe wrapper for external process execution.
/// Spawns without a shell and blocks until the child exits.
#[derive(Debug)]
pub struct Cmd {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputData {
    pub stdout: String,
    pub stderr: String,
    pub status: i32,
}

impl OutputData {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

impl Cmd {
    /// Resolve an allowlisted tool by name against the standard bin directories.
    pub fn new_allowlisted(tool: &str) -> Result<Self> {
        if !ALLOWED_TOOLS.contains(&tool) {
            return Err(anyhow!("Command '{}' not in allowlist", tool));
        }
        let path = SEARCH_DIRS
            .iter()
            .map(|dir| Path::new(dir).join(tool))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| anyhow!("{} binary not found. Checked: {:?}", tool, SEARCH_DIRS))?;
        Ok(Self { path })
    }

    /// Run command with arguments, returning `OutputData`
    pub fn run(&self, args: &[&str]) -> Result<OutputData> {
        debug!("Running: {} {}", self.path.display(), args.join(" "));
        let output = Command::new(&self.path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .with_context(|| format!("spawn {}", self.path.display()))?;

        Ok(OutputData {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            status: output.status.code().unwrap_or(-1),
        })
    }
}
