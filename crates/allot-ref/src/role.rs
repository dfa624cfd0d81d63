//! Handle roles.

use std::fmt;

/// How a handle relates to its referent.
///
/// The role decides what copy, transfer and release do. `Owned` and
/// `Shared` release identically (drop one share, destroy on the last);
/// the distinction records how the handle came to exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Value-owning: created by allocation or deep copy.
    Owned,
    /// Shared-owning: created by a successful share conversion.
    Shared,
    /// Observational only; never releases anything.
    Weak,
}

impl Role {
    /// Whether a handle with this role takes part in release.
    #[inline]
    pub fn releases(self) -> bool {
        !matches!(self, Role::Weak)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Owned => "owned",
            Role::Shared => "shared",
            Role::Weak => "weak",
        })
    }
}
