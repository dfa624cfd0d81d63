//! Allot: pluggable memory providers and role-tagged typed handles.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Allot sub-crates. For most users, adding `allot` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use allot::prelude::*;
//!
//! // Values live in whichever provider made them.
//! let arena = BumpArena::new();
//! let a = arena.make(String::from("Bob"));
//! let b = a.clone(); // deep copy, same provider
//! assert_eq!(*b, "Bob");
//!
//! // A counting provider lets handles share one referent.
//! let rc = RefCounted::new(Heap::new());
//! let owner = rc.make(42u32);
//! let alias = owner.share();
//! assert!(alias.is_shared());
//! assert_eq!(*alias, 42);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`base`] | `allot-core` | `Block`, the `Allocator` contract, errors, contract checks |
//! | [`providers`] | `allot-alloc` | Heap, plain heap, bump arena, refcount adapter |
//! | [`handle`] | `allot-ref` | `Ref`, roles, weak views, unique handles, helpers |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Block descriptors and the provider contract (`allot-core`).
///
/// Implement [`base::Allocator`] to plug a new provider into the handle
/// layer.
pub use allot_core as base;

/// Concrete providers (`allot-alloc`).
///
/// [`providers::Heap`] and [`providers::PlainHeap`] for general use,
/// [`providers::BumpArena`] for LIFO-scoped scratch, and
/// [`providers::RefCounted`] to add sharing to any of them.
pub use allot_alloc as providers;

/// Typed handles and construction helpers (`allot-ref`).
///
/// Includes the per-thread current provider in [`handle::current`].
pub use allot_ref as handle;

/// Common imports for typical Allot usage.
///
/// ```rust
/// use allot::prelude::*;
/// ```
pub mod prelude {
    // Core
    pub use allot_core::{AllocError, Allocator, Block};

    // Providers
    pub use allot_alloc::{ArenaConfig, BumpArena, Heap, PlainHeap, RefCounted};

    // Handles
    pub use allot_ref::current;
    pub use allot_ref::{Alias, AllocatorExt, Ref, RefError, Role, Unique, WeakRef};
}
