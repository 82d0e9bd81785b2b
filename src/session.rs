// ============================================================================
// src/session.rs – resolve / switch lifecycle for one invocation
// ============================================================================

use anyhow::Result;
use tracing::debug;

use crate::error::BootError;
use crate::partition::Partition;
use crate::state::{BootBackend, SystemInfo};
use crate::switch::SwitchOutcome;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Resolving,
    Resolved,
    Switching,
    /// A switch is recorded on the device and waits for a reboot.
    Switched,
}

/// Drives a backend through at most one boot switch.
pub struct Session<'a, B: BootBackend + ?Sized> {
    backend: &'a B,
    phase: Phase,
    snapshot: Option<SystemInfo>,
}

impl<'a, B: BootBackend + ?Sized> Session<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self {
            backend,
            phase: Phase::Idle,
            snapshot: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn backend(&self) -> &'a B {
        self.backend
    }

    fn enter(&mut self, phase: Phase) {
        debug!("session {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    /// Take a fresh snapshot. After a switch the session stays `Switched`.
    pub fn resolve(&mut self) -> Result<&SystemInfo, BootError> {
        let settled = if self.phase == Phase::Switched {
            Phase::Switched
        } else {
            Phase::Resolved
        };
        self.enter(Phase::Resolving);
        match self.backend.snapshot() {
            Ok(info) => {
                self.enter(settled);
                Ok(self.snapshot.insert(info))
            }
            Err(err) => {
                self.enter(if settled == Phase::Switched {
                    Phase::Switched
                } else {
                    Phase::Idle
                });
                Err(err)
            }
        }
    }

    /// Switch the next boot to `target`, using the last snapshot.
    pub fn switch_to(&mut self, target: Partition) -> Result<SwitchOutcome, BootError> {
        if self.phase == Phase::Switched {
            return Err(BootError::switch(
                "switch",
                "a boot switch is already pending; reboot before switching again",
            ));
        }
        let current = match (self.phase, self.snapshot.as_ref()) {
            (Phase::Resolved, Some(info)) => info,
            _ => {
                return Err(BootError::resolution(
                    "boot state must be resolved before switching",
                ))
            }
        };

        let backend = self.backend;
        let current = current.clone();
        self.enter(Phase::Switching);
        match backend.switch_boot(target, &current) {
            Ok(outcome) => {
                self.enter(Phase::Switched);
                Ok(outcome)
            }
            Err(err) => {
                // The device may hold a partial write; only a new snapshot is trustworthy.
                self.snapshot = None;
                self.enter(Phase::Idle);
                Err(err)
            }
        }
    }

    /// Hand over to the backend's reboot. A pending switch is consumed.
    pub fn reboot(&mut self) -> Result<()> {
        self.backend.reboot()?;
        self.snapshot = None;
        self.enter(Phase::Idle);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dry_run::DryRunStore;
    use tempfile::tempdir;

    #[test]
    fn walks_through_phases() {
        let dir = tempdir().unwrap();
        let store = DryRunStore::new(dir.path().join("marker"));
        let mut session = Session::new(&store);
        assert_eq!(session.phase(), Phase::Idle);

        let info = session.resolve().unwrap().clone();
        assert_eq!(session.phase(), Phase::Resolved);
        assert_eq!(info.next_boot, Partition::RootB);

        session.switch_to(Partition::RootA).unwrap();
        assert_eq!(session.phase(), Phase::Switched);

        let refreshed = session.resolve().unwrap();
        assert_eq!(refreshed.next_boot, Partition::RootA);
        assert_eq!(session.phase(), Phase::Switched);
    }

    #[test]
    fn switch_requires_resolution() {
        let dir = tempdir().unwrap();
        let store = DryRunStore::new(dir.path().join("marker"));
        let mut session = Session::new(&store);
        assert!(matches!(
            session.switch_to(Partition::RootA),
            Err(BootError::Resolution(_))
        ));
        assert!(!store.marker().exists());
    }

    #[test]
    fn only_one_switch_per_session() {
        let dir = tempdir().unwrap();
        let store = DryRunStore::new(dir.path().join("marker"));
        let mut session = Session::new(&store);
        session.resolve().unwrap();
        session.switch_to(Partition::RootA).unwrap();
        session.resolve().unwrap();

        assert!(matches!(
            session.switch_to(Partition::RootB),
            Err(BootError::Switch { .. })
        ));
        assert_eq!(store.stored_next_boot(), Partition::RootA);
    }

    #[test]
    fn reboot_returns_to_idle() {
        let dir = tempdir().unwrap();
        let store = DryRunStore::new(dir.path().join("marker"));
        let mut session = Session::new(&store);
        session.resolve().unwrap();
        session.switch_to(Partition::RootA).unwrap();

        session.reboot().unwrap();
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.resolve().unwrap().next_boot, Partition::RootA);
        session.switch_to(Partition::RootB).unwrap();
    }

    #[test]
    fn failed_switch_returns_to_idle() {
        let dir = tempdir().unwrap();
        let store = DryRunStore::new(dir.path().join("absent").join("marker"));
        let mut session = Session::new(&store);
        session.resolve().unwrap();

        assert!(session.switch_to(Partition::RootA).is_err());
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.switch_to(Partition::RootA).is_err());
    }
}
