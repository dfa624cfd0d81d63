//! The per-thread current allocator.
//!
//! Free-standing helpers ([`make`], [`try_make`], [`make_unique`],
//! [`make_as`]) allocate from whichever provider was most recently
//! installed on this thread. Installation is scoped: [`install`] returns
//! a guard that restores the previous provider when dropped.
//!
//! ```
//! use allot_alloc::Heap;
//! use allot_ref::current;
//!
//! let heap: &'static Heap = Box::leak(Box::new(Heap::new()));
//! let _guard = current::install(heap);
//! let n = current::make(5u32);
//! assert_eq!(*n, 5);
//! ```

use std::cell::RefCell;
use std::marker::PhantomData;

use allot_core::{contract, Allocator};

use crate::error::RefError;
use crate::handle::Ref;
use crate::make::{same_allocator, AllocatorExt};
use crate::unique::Unique;

thread_local! {
    static STACK: RefCell<Vec<&'static dyn Allocator>> = const { RefCell::new(Vec::new()) };
}

/// Restores the previously installed provider on drop.
///
/// Guards must be dropped in reverse order of installation.
#[must_use = "the provider is uninstalled as soon as the guard is dropped"]
pub struct InstallGuard {
    depth: usize,
    // Installation is per-thread; the guard must be dropped where it was made.
    _not_send: PhantomData<*const ()>,
}

impl Drop for InstallGuard {
    fn drop(&mut self) {
        STACK.with(|s| {
            let mut stack = s.borrow_mut();
            contract!(
                stack.len() == self.depth,
                "current allocator guards dropped out of order (depth {} != {})",
                stack.len(),
                self.depth
            );
            stack.truncate(self.depth - 1);
        });
    }
}

/// Make `alloc` the current provider for this thread until the guard drops.
pub fn install(alloc: &'static dyn Allocator) -> InstallGuard {
    let depth = STACK.with(|s| {
        let mut stack = s.borrow_mut();
        stack.push(alloc);
        stack.len()
    });
    InstallGuard {
        depth,
        _not_send: PhantomData,
    }
}

/// Run `f` with `alloc` installed.
pub fn with<R>(alloc: &'static dyn Allocator, f: impl FnOnce() -> R) -> R {
    let _guard = install(alloc);
    f()
}

/// The current provider, if one is installed.
pub fn get() -> Option<&'static dyn Allocator> {
    STACK.with(|s| s.borrow().last().copied())
}

/// Whether `alloc` is the current provider.
pub fn is_current(alloc: &dyn Allocator) -> bool {
    get().is_some_and(|c| same_allocator(c, alloc))
}

fn require() -> &'static dyn Allocator {
    match get() {
        Some(alloc) => alloc,
        None => contract::fatal(format_args!("no current allocator installed")),
    }
}

/// Allocate `value` from the current provider.
///
/// Panics if no provider is installed.
pub fn make<T>(value: T) -> Ref<'static, T> {
    require().make(value)
}

/// Fallible [`make`].
pub fn try_make<T>(value: T) -> Result<Ref<'static, T>, RefError> {
    get().ok_or(RefError::NoCurrentAllocator)?.try_make(value)
}

/// Allocate a move-only handle from the current provider.
pub fn make_unique<T>(value: T) -> Unique<'static, T> {
    require().make_unique(value)
}

/// Allocate `value` from the current provider and expose it as `U`.
pub fn make_as<T, U, F>(value: T, view: F) -> Ref<'static, U>
where
    U: ?Sized,
    F: FnOnce(&T) -> &U,
{
    require().make_as(value, view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use allot_alloc::{BumpArena, Heap, RefCounted};

    fn leak<A: Allocator + 'static>(alloc: A) -> &'static A {
        Box::leak(Box::new(alloc))
    }

    #[test]
    fn nothing_installed() {
        assert!(get().is_none());
        assert_eq!(try_make(1u8).unwrap_err(), RefError::NoCurrentAllocator);
    }

    #[test]
    #[should_panic(expected = "no current allocator installed")]
    fn make_without_provider_panics() {
        let _ = make(1u8);
    }

    #[test]
    fn install_is_scoped() {
        let heap = leak(Heap::new());
        let arena = leak(BumpArena::new());
        {
            let _outer = install(heap);
            assert!(is_current(heap));
            {
                let _inner = install(arena);
                assert!(is_current(arena));
                let r = make(3u16);
                assert_eq!(arena.live_count(), 1);
                drop(r);
            }
            assert!(is_current(heap));
        }
        assert!(get().is_none());
    }

    #[cfg(debug_assertions)]
    #[test]
    fn guards_dropped_out_of_order_are_reported() {
        use allot_core::contract::violations;

        let heap = leak(Heap::new());
        let arena = leak(BumpArena::new());
        let before = violations();
        let outer = install(heap);
        let inner = install(arena);
        drop(outer);
        assert_eq!(violations(), before + 1);
        assert!(get().is_none(), "outer guard unwinds everything above it");
        drop(inner);
        assert_eq!(violations(), before + 2);
        assert!(get().is_none());
    }

    #[test]
    fn helpers_use_the_current_provider() {
        let rc = leak(RefCounted::new(Heap::new()));
        with(rc, || {
            let a = make(1u32);
            let u = make_unique(2u32);
            let d = make_as(3u32, |n| n as &dyn std::fmt::Debug);
            assert_eq!(rc.live_count(), 3);
            assert_eq!(*a + *u, 3);
            assert_eq!(format!("{:?}", &*d), "3");
            assert_eq!(format!("{d:?}"), "Ref { role: Owned, value: 3 }");
        });
        assert_eq!(rc.live_count(), 0);
    }

    #[test]
    fn installation_is_per_thread() {
        let heap = leak(Heap::new());
        let _guard = install(heap);
        let seen = std::thread::spawn(|| get().is_some()).join().unwrap();
        assert!(!seen);
    }
}
