// ============================================================================
// src/device.rs – hardware family detection from the device-tree model
// ============================================================================

use std::fmt;
use std::path::Path;
use tracing::debug;

use crate::host::Host;

/// Model names of the boards that manage boot through swupdate and eMMC.
const NEXT_GEN_MODELS: &[&str] = &["reMarkable Ferrari", "reMarkable Chiappa"];

const STANDARD_MODEL: &str = "reMarkable 2";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceFamily {
    Legacy,
    Standard,
    NextGen,
}

impl DeviceFamily {
    /// Legacy and Standard share the u-boot environment mechanics.
    pub fn uses_uboot_env(self) -> bool {
        !matches!(self, DeviceFamily::NextGen)
    }
}

impl fmt::Display for DeviceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceFamily::Legacy => "legacy",
            DeviceFamily::Standard => "standard",
            DeviceFamily::NextGen => "next-gen",
        };
        f.write_str(name)
    }
}

pub fn family_from_model(model: &str) -> DeviceFamily {
    if NEXT_GEN_MODELS.iter().any(|m| model.contains(m)) {
        DeviceFamily::NextGen
    } else if model.contains(STANDARD_MODEL) {
        DeviceFamily::Standard
    } else {
        DeviceFamily::Legacy
    }
}

/// Classify the running device. An unreadable model file means Legacy.
pub fn classify(host: &dyn Host, model_path: &Path) -> DeviceFamily {
    let model = match host.read_to_string(model_path) {
        Ok(raw) => raw.trim_end_matches('\0').trim().to_string(),
        Err(err) => {
            debug!("cannot read {}: {}", model_path.display(), err);
            String::new()
        }
    };
    let family = family_from_model(&model);
    debug!("device model {:?} classified as {}", model, family);
    family
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::fake::FakeHost;

    #[test]
    fn next_gen_models() {
        assert_eq!(family_from_model("reMarkable Ferrari"), DeviceFamily::NextGen);
        assert_eq!(family_from_model("reMarkable Chiappa"), DeviceFamily::NextGen);
    }

    #[test]
    fn older_models() {
        assert_eq!(family_from_model("reMarkable 2.0"), DeviceFamily::Standard);
        assert_eq!(family_from_model("reMarkable 1.0"), DeviceFamily::Legacy);
        assert_eq!(family_from_model(""), DeviceFamily::Legacy);
    }

    #[test]
    fn reads_nul_terminated_model_file() {
        let host = FakeHost::new().with_file("/proc/device-tree/model", "reMarkable Ferrari\0");
        assert_eq!(
            classify(&host, Path::new("/proc/device-tree/model")),
            DeviceFamily::NextGen
        );
    }

    #[test]
    fn missing_model_file_is_legacy() {
        let host = FakeHost::new();
        let family = classify(&host, Path::new("/proc/device-tree/model"));
        assert_eq!(family, DeviceFamily::Legacy);
        assert!(family.uses_uboot_env());
    }
}
