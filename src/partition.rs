// ============================================================================
// src/partition.rs – the two root partitions and their hardware mappings
// ============================================================================

use std::fmt;

use crate::error::BootError;

/// One of the two OS root partitions. Partition 2 is slot A, partition 3 is slot B.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Partition {
    RootA,
    RootB,
}

impl Partition {
    pub const ALL: [Partition; 2] = [Partition::RootA, Partition::RootB];

    pub fn from_number(n: u32) -> Result<Self, BootError> {
        match n {
            2 => Ok(Partition::RootA),
            3 => Ok(Partition::RootB),
            other => Err(BootError::InvalidPartitionNumber(other)),
        }
    }

    pub fn number(self) -> u32 {
        match self {
            Partition::RootA => 2,
            Partition::RootB => 3,
        }
    }

    /// The numeric complement within {2, 3}.
    pub fn other(self) -> Self {
        match self {
            Partition::RootA => Partition::RootB,
            Partition::RootB => Partition::RootA,
        }
    }

    pub fn slot(self) -> char {
        match self {
            Partition::RootA => 'A',
            Partition::RootB => 'B',
        }
    }

    /// Letter written to / read from the legacy `root_part` sysfs attribute.
    pub fn root_part_letter(self) -> &'static str {
        match self {
            Partition::RootA => "a",
            Partition::RootB => "b",
        }
    }

    pub fn from_root_part_letter(value: &str) -> Option<Self> {
        match value {
            "a" => Some(Partition::RootA),
            "b" => Some(Partition::RootB),
            _ => None,
        }
    }

    /// Value of the `boot_part` attribute exposed by 3.22+ firmware.
    pub fn from_boot_part_value(value: &str) -> Option<Self> {
        match value {
            "1" => Some(Partition::RootA),
            "2" => Some(Partition::RootB),
            _ => None,
        }
    }

    /// Arguments for `mmc bootpart enable`. Fixed by the board layout.
    pub fn mmc_bootpart_args(self) -> [&'static str; 5] {
        match self {
            Partition::RootA => ["bootpart", "enable", "1", "0", "/dev/mmcblk0boot0"],
            Partition::RootB => ["bootpart", "enable", "2", "0", "/dev/mmcblk0boot1"],
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Split `/dev/mmcblk2p3` into (`/dev/mmcblk2`, 3).
fn split_partition_suffix(device: &str) -> Option<(&str, u32)> {
    let device = device.trim();
    let digits_start = device
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    let head = &device[..digits_start];
    let base = head.strip_suffix('p')?;
    let number = device[digits_start..].parse().ok()?;
    Some((base, number))
}

/// Parse the trailing `p<N>` partition number of a block device path.
pub fn partition_number_from_device(device: &str) -> Result<u32, BootError> {
    split_partition_suffix(device)
        .map(|(_, n)| n)
        .ok_or_else(|| {
            BootError::resolution(format!(
                "could not parse partition number from {}",
                device.trim()
            ))
        })
}

/// Path of `partition` on the same disk as `running_device`.
pub fn sibling_device(running_device: &str, partition: Partition) -> Result<String, BootError> {
    let (base, _) = split_partition_suffix(running_device).ok_or_else(|| {
        BootError::resolution(format!(
            "could not derive disk from {}",
            running_device.trim()
        ))
    })?;
    Ok(format!("{}p{}", base, partition.number()))
}
