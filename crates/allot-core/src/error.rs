//! Allocation error types.

use std::error::Error;
use std::fmt;

/// Why a provider could not hand out a block.
///
/// On the infallible handle paths (`make`, `Clone`) `OutOfMemory` aborts
/// through `handle_alloc_error` and the other variants panic; the fallible
/// constructors pass them up unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// A fixed-capacity provider has no room left for the request.
    CapacityExceeded {
        /// Bytes requested, including alignment padding.
        requested: usize,
        /// Bytes still free before the request.
        remaining: usize,
        /// Total capacity of the provider.
        capacity: usize,
    },
    /// The platform allocator returned null.
    OutOfMemory {
        /// Requested size in bytes.
        size: usize,
        /// Requested alignment in bytes.
        align: usize,
    },
    /// The provider cannot honour the requested alignment.
    UnsupportedAlignment {
        /// Requested alignment in bytes.
        align: usize,
        /// Largest alignment the provider guarantees.
        max: usize,
    },
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded {
                requested,
                remaining,
                capacity,
            } => write!(
                f,
                "capacity exceeded: requested {requested} bytes, {remaining} of {capacity} bytes remaining"
            ),
            Self::OutOfMemory { size, align } => {
                write!(f, "out of memory: {size} bytes aligned to {align}")
            }
            Self::UnsupportedAlignment { align, max } => {
                write!(f, "unsupported alignment {align} (provider guarantees at most {max})")
            }
        }
    }
}

impl Error for AllocError {}
