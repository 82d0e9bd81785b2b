// ============================================================================
// src/config.rs – optional config file (device paths, dry-run, logging)
// ============================================================================

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/rm-version-switcher.toml";
pub const CONFIG_ENV: &str = "RM_SWITCHER_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paths {
    /// Root of the running OS; label files of the active partition live here.
    #[serde(default = "default_live_root")]
    pub live_root: PathBuf,

    /// Device-tree model string used to classify the hardware.
    #[serde(default = "default_device_model")]
    pub device_model: PathBuf,

    /// Next-boot attribute on 3.22+ NextGen firmware.
    #[serde(default = "default_boot_part")]
    pub boot_part: PathBuf,

    /// Next-boot attribute on older NextGen firmware.
    #[serde(default = "default_root_part")]
    pub root_part: PathBuf,

    /// Where `mount_p<N>` scratch mount points are created.
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,
}

fn default_live_root() -> PathBuf {
    PathBuf::from("/")
}

fn default_device_model() -> PathBuf {
    PathBuf::from("/proc/device-tree/model")
}

fn default_boot_part() -> PathBuf {
    PathBuf::from("/sys/bus/mmc/devices/mmc0:0001/boot_part")
}

fn default_root_part() -> PathBuf {
    PathBuf::from("/sys/devices/platform/lpgpr/root_part")
}

fn default_scratch_dir() -> PathBuf {
    PathBuf::from("/tmp")
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            live_root: default_live_root(),
            device_model: default_device_model(),
            boot_part: default_boot_part(),
            root_part: default_root_part(),
            scratch_dir: default_scratch_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DryRun {
    /// Marker file holding the simulated next-boot partition.
    #[serde(default = "default_marker_path")]
    pub marker_path: PathBuf,
}

fn default_marker_path() -> PathBuf {
    PathBuf::from("dry-run-boot.txt")
}

impl Default for DryRun {
    fn default() -> Self {
        Self {
            marker_path: default_marker_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Logging {
    /// File appended to when `--debug` is given.
    #[serde(default = "default_debug_log")]
    pub debug_log: PathBuf,

    /// Stderr filter used when RUST_LOG is unset.
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_debug_log() -> PathBuf {
    PathBuf::from("debug.log")
}

fn default_filter() -> String {
    "warn".to_string()
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            debug_log: default_debug_log(),
            filter: default_filter(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub dry_run: DryRun,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load<P: AsRef<Path>>(p: P) -> Result<Self> {
        let s = fs::read_to_string(&p)
            .with_context(|| format!("read config: {}", p.as_ref().display()))?;
        let cfg: Self = if p.as_ref().extension().and_then(|e| e.to_str()) == Some("toml") {
            toml::from_str(&s).context("toml parse")?
        } else {
            serde_yaml::from_str(&s).context("yaml parse")?
        };
        Ok(cfg)
    }

    /// `$RM_SWITCHER_CONFIG` if set, else the system config if present,
    /// else built-in defaults.
    pub fn discover() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::load(PathBuf::from(path));
        }
        let system = Path::new(DEFAULT_CONFIG_PATH);
        if system.exists() {
            return Self::load(system);
        }
        Ok(Self::default())
    }
}
