// ============================================================================
// src/util/privilege.rs – effective-uid checks
// ============================================================================

use nix::unistd::Uid;

/// Every switch mechanism writes root-owned state.
pub fn is_root() -> bool {
    Uid::effective().is_root()
}
