// ============================================================================
// src/menu.rs – Interactive prompts (confirmations and slot selection)
// ============================================================================

use anyhow::{Context, Result};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Select};

use crate::partition::Partition;
use crate::state::SystemInfo;

/// Yes/no question, defaulting to no.
pub fn confirm(prompt: &str) -> Result<bool> {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
        .with_context(|| format!("prompt failed: {}", prompt))
}

/// Entries for the slot picker, A then B, plus the index of the current
/// next-boot slot.
pub fn slot_choices(info: &SystemInfo) -> (Vec<(Partition, String)>, usize) {
    let choices: Vec<(Partition, String)> = info
        .slots()
        .iter()
        .map(|p| (p.number, format!("Partition {}: {}", p.number.slot(), p.version)))
        .collect();
    let preselected = choices
        .iter()
        .position(|(p, _)| *p == info.next_boot)
        .unwrap_or(0);
    (choices, preselected)
}

pub fn select_partition(info: &SystemInfo) -> Result<Partition> {
    let (choices, preselected) = slot_choices(info);
    let labels: Vec<&str> = choices.iter().map(|(_, label)| label.as_str()).collect();

    let idx = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select next boot partition")
        .items(&labels)
        .default(preselected)
        .interact()
        .context("partition selection failed")?;

    choices
        .get(idx)
        .map(|(p, _)| *p)
        .context("selection out of range")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceFamily;

    #[test]
    fn choices_follow_slot_order() {
        let info = SystemInfo::assemble(
            DeviceFamily::NextGen,
            Partition::RootB,
            Partition::RootB,
            "3.22.0.64".into(),
            "3.20.0.92".into(),
        );
        let (choices, preselected) = slot_choices(&info);
        assert_eq!(
            choices,
            vec![
                (Partition::RootA, "Partition A: 3.20.0.92".to_string()),
                (Partition::RootB, "Partition B: 3.22.0.64".to_string()),
            ]
        );
        assert_eq!(preselected, 1);
    }

    #[test]
    fn preselects_pending_slot() {
        let info = SystemInfo::assemble(
            DeviceFamily::Standard,
            Partition::RootB,
            Partition::RootA,
            "3.20".into(),
            "unknown".into(),
        );
        let (choices, preselected) = slot_choices(&info);
        assert_eq!(preselected, 0);
        assert_eq!(choices[0].1, "Partition A: unknown");
    }
}
