//! Concrete memory providers for Allot.
//!
//! Four interchangeable implementations of [`allot_core::Allocator`]:
//!
//! ```text
//! Heap            aligned, global allocator, no sharing
//! PlainHeap       system malloc, fixed 16-byte alignment, no sharing
//! BumpArena       fixed 4 KiB buffer, cursor bump, LIFO reclamation
//! RefCounted<A>   share counter word appended to every block of A
//! ```
//!
//! All providers are single-threaded: bookkeeping lives in `Cell`s.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod arena;
pub mod config;
pub mod heap;
pub mod refcount;

pub use arena::BumpArena;
pub use config::{ArenaConfig, ConfigError};
pub use heap::{Heap, PlainHeap};
pub use refcount::RefCounted;
