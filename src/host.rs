// ============================================================================
// src/host.rs – access to the device: external tools plus file I/O
// ============================================================================

use anyhow::{bail, Result};
use std::fs;
use std::io;
use std::path::Path;

use crate::cmd::{Cmd, OutputData};

/// Everything the resolver and switcher touch on the running device.
pub trait Host {
    fn run(&self, tool: &str, args: &[&str]) -> Result<OutputData>;
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Run a tool and return its trimmed stdout, failing on a non-zero exit.
    fn run_stdout(&self, tool: &str, args: &[&str]) -> Result<String> {
        let out = self.run(tool, args)?;
        if !out.success() {
            bail!(
                "{} {} exited with status {}: {}",
                tool,
                args.join(" "),
                out.status,
                out.stderr.trim()
            );
        }
        Ok(out.stdout.trim().to_string())
    }
}

/// The real device.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHost;

impl Host for SystemHost {
    fn run(&self, tool: &str, args: &[&str]) -> Result<OutputData> {
        Cmd::new_allowlisted(tool)?.run(args)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        fs::write(path, contents)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path)
    }
}


#[cfg(test)]
mod tests {
    use super::fake::FakeHost;
    use super::Host;

    #[test]
    fn run_stdout_trims_and_checks_status() {
        let host = FakeHost::new()
            .with_output("rootdev", "/dev/mmcblk2p2\n")
            .with_failure("fw_printenv active_partition", 1, "not defined");

        assert_eq!(host.run_stdout("rootdev", &[]).unwrap(), "/dev/mmcblk2p2");
        let err = host
            .run_stdout("fw_printenv", &["active_partition"])
            .unwrap_err();
        assert!(err.to_string().contains("not defined"));
    }
}
