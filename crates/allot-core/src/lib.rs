//! Core types and traits for the Allot memory providers.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the shared currency between providers and handles:
//!
//! - [`Block`]: an untyped `{address, size, align}` descriptor.
//! - [`Allocator`]: the capability set every provider satisfies.
//! - [`AllocError`]: why a provider could not hand out storage.
//! - [`contract`]: the debug-only assertion facility for programmer errors.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod block;
pub mod contract;
pub mod error;
pub mod traits;

pub use block::Block;
pub use error::AllocError;
pub use traits::Allocator;
