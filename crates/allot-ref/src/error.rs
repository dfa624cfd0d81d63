//! Handle-level error types.

use std::error::Error;
use std::fmt;

use allot_core::AllocError;

/// Errors from the fallible handle operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefError {
    /// The provider could not hand out a block.
    Alloc(AllocError),
    /// The handle does not point at anything.
    Empty,
    /// A free-standing helper ran with no allocator installed.
    NoCurrentAllocator,
    /// The handle is not the sole owner of its referent.
    NotUnique,
}

impl fmt::Display for RefError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alloc(e) => write!(f, "allocation failed: {e}"),
            Self::Empty => write!(f, "handle is empty"),
            Self::NoCurrentAllocator => write!(f, "no current allocator installed"),
            Self::NotUnique => write!(f, "handle is not the sole owner of its referent"),
        }
    }
}

impl Error for RefError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Alloc(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AllocError> for RefError {
    fn from(e: AllocError) -> Self {
        Self::Alloc(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_error_is_the_source() {
        let e = RefError::from(AllocError::OutOfMemory { size: 8, align: 8 });
        assert!(e.source().is_some());
        assert!(e.to_string().starts_with("allocation failed"));
        assert!(RefError::Empty.source().is_none());
    }
}
