//! Role-tagged typed handles over Allot memory providers.
//!
//! A [`Ref`] owns (or observes) one value living in a block issued by a
//! [`allot_core::Allocator`]. Handles carry a [`Role`]:
//!
//! - **Owned:** created by allocation or deep copy; releases on drop.
//! - **Shared:** created by [`Ref::share`] on a provider that supports
//!   sharing; releases on drop, destroying the value on the last share.
//! - **Weak:** observes a referent owned elsewhere and never releases it.
//!   [`WeakRef`] views borrow their owner, so they cannot dangle.
//!
//! Values are constructed through [`AllocatorExt`] on an explicit
//! provider, or through [`current`] on the provider installed for the
//! calling thread.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod current;
pub mod error;
pub mod handle;
pub mod make;
pub mod role;
pub mod unique;
pub mod view;

pub use error::RefError;
pub use handle::Ref;
pub use make::{same_allocator, AllocatorExt};
pub use role::Role;
pub use unique::Unique;
pub use view::{Alias, WeakRef};
