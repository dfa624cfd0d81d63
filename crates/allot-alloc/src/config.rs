//! Provider configuration parameters.

use std::error::Error;
use std::fmt;

/// Configuration for a [`BumpArena`](crate::BumpArena).
///
/// Validated at construction; immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Size of the arena's backing buffer in bytes.
    ///
    /// Default: 4096. Must be non-zero. The buffer never grows: requests
    /// that do not fit fail with `AllocError::CapacityExceeded`.
    pub capacity: usize,
}

impl ArenaConfig {
    /// Default buffer size: 4 KiB.
    pub const DEFAULT_CAPACITY: usize = 4 * 1024;

    /// Create a config with the given buffer size in bytes.
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Check the config, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.capacity > isize::MAX as usize {
            return Err(ConfigError::CapacityTooLarge {
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}

/// Invalid [`ArenaConfig`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Capacity is zero.
    ZeroCapacity,
    /// Capacity cannot be described by a `Layout`.
    CapacityTooLarge {
        /// The configured capacity.
        capacity: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroCapacity => write!(f, "arena capacity must be non-zero"),
            Self::CapacityTooLarge { capacity } => {
                write!(f, "arena capacity {capacity} exceeds isize::MAX")
            }
        }
    }
}

impl Error for ConfigError {}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
