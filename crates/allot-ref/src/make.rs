//! Construction helpers bound to an explicit provider.
//!
//! [`AllocatorExt`] is implemented for every sized provider and for
//! `dyn Allocator`, so both `heap.make(x)` and `alloc_ref.make(x)` work.

#![allow(unsafe_code)]

use std::alloc::{handle_alloc_error, Layout};
use std::mem;
use std::ptr;

use allot_core::{contract, AllocError, Allocator};

use crate::error::RefError;
use crate::handle::Ref;
use crate::unique::Unique;

/// Typed construction on top of [`Allocator`].
pub trait AllocatorExt: Allocator {
    /// This provider as a trait object.
    fn as_dyn(&self) -> &dyn Allocator;

    /// Allocate storage for `value` and move it in.
    fn try_make<T>(&self, value: T) -> Result<Ref<'_, T>, RefError> {
        let alloc = self.as_dyn();
        let block = alloc.allocate(Layout::new::<T>())?;
        // SAFETY: the block is fresh and was requested with `T`'s layout.
        unsafe {
            block.as_ptr().cast::<T>().write(value);
            Ok(Ref::from_block(block, alloc))
        }
    }

    /// Infallible [`AllocatorExt::try_make`].
    ///
    /// Running out of memory aborts through [`handle_alloc_error`]; other
    /// refusals (a full arena, an unsupported alignment) are contract
    /// violations and panic.
    fn make<T>(&self, value: T) -> Ref<'_, T> {
        expect_alloc(self.try_make(value), Layout::new::<T>())
    }

    /// Like [`AllocatorExt::make`], returning a move-only handle.
    fn make_unique<T>(&self, value: T) -> Unique<'_, T> {
        Unique::new_unchecked(self.make(value))
    }

    /// Construct a `T` and expose it as `U`, typically a trait object.
    ///
    /// ```
    /// use allot_alloc::Heap;
    /// use allot_ref::AllocatorExt;
    /// use std::fmt::Display;
    ///
    /// let heap = Heap::new();
    /// let shown = heap.make_as(42u32, |n| n as &dyn Display);
    /// assert_eq!(shown.to_string(), "42");
    /// ```
    fn make_as<T, U, F>(&self, value: T, view: F) -> Ref<'_, U>
    where
        U: ?Sized,
        F: FnOnce(&T) -> &U,
    {
        self.make(value).upcast(view)
    }

    /// Move a handle into this provider.
    ///
    /// A handle already issued by this provider is rebound without
    /// copying. Otherwise the value is deep-copied into a fresh block
    /// here and the source handle is released.
    fn transfer<'s, T: Clone>(&'s self, handle: Ref<'_, T>) -> Result<Ref<'s, T>, RefError> {
        let target = self.as_dyn();
        if handle.is_empty() {
            return Err(RefError::Empty);
        }
        if handle.allocator().is_some_and(|a| same_allocator(a, target)) {
            // SAFETY: the handle's provider is `target`.
            return Ok(unsafe { handle.rebind(target) });
        }
        let copy = target.try_make((*handle).clone())?;
        drop(handle);
        Ok(copy)
    }

    /// Whether `handle` was issued by this provider.
    fn issued<T: ?Sized>(&self, handle: &Ref<'_, T>) -> bool {
        handle
            .allocator()
            .is_some_and(|a| same_allocator(a, self.as_dyn()))
    }
}

impl<A: Allocator> AllocatorExt for A {
    fn as_dyn(&self) -> &dyn Allocator {
        self
    }
}

impl AllocatorExt for dyn Allocator + '_ {
    fn as_dyn(&self) -> &dyn Allocator {
        self
    }
}

/// Whether two provider references denote the same provider object.
///
/// A decorator and the provider it wraps can share an address, so the
/// object sizes and names must match as well.
pub fn same_allocator(a: &dyn Allocator, b: &dyn Allocator) -> bool {
    ptr::addr_eq(a, b) && mem::size_of_val(a) == mem::size_of_val(b) && a.name() == b.name()
}

/// Unwrap a construction result for the infallible helpers.
pub(crate) fn expect_alloc<R>(result: Result<R, RefError>, layout: Layout) -> R {
    match result {
        Ok(r) => r,
        Err(RefError::Alloc(AllocError::OutOfMemory { .. })) => handle_alloc_error(layout),
        Err(e) => contract::fatal(format_args!("{e}")),
    }
}
