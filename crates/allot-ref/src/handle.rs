//! The role-tagged typed handle.
//!
//! A [`Ref`] pairs a provider [`Block`] with the provider that issued it
//! and a [`Role`]. The role decides what happens on copy and release:
//!
//! | role     | clone            | release                                    |
//! |----------|------------------|--------------------------------------------|
//! | `Owned`  | deep copy        | destroy if last share, then deallocate     |
//! | `Shared` | deep copy        | destroy if last share, then deallocate     |
//! | `Weak`   | deep copy        | nothing                                    |
//!
//! Release is idempotent: after it runs the handle is empty.
//!
//! Handles borrow their provider, so a provider cannot be dropped or
//! bulk-released (`deallocate_all` takes `&mut self`) while a handle
//! into it is alive.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::fmt;
use std::marker::PhantomData;
use std::mem::{self, ManuallyDrop};
use std::ops::Deref;
use std::ptr::{self, NonNull};

use allot_core::{contract, Allocator, Block};

use crate::error::RefError;
use crate::make::{expect_alloc, AllocatorExt};
use crate::role::Role;
use crate::view::{Alias, WeakRef};

/// Destroys the value at the start of a block, erased over its type.
type DropFn = unsafe fn(*mut u8);

unsafe fn drop_erased<T>(ptr: *mut u8) {
    // SAFETY: installed only by `Ref::from_block::<T>`, whose caller
    // guarantees the block holds an initialised `T`.
    unsafe { ptr::drop_in_place(ptr.cast::<T>()) }
}

unsafe fn drop_nothing(_: *mut u8) {}

/// Typed handle to a value living in a provider block.
///
/// Created by [`AllocatorExt::make`] (or the fallible and unique
/// variants), by the free-standing helpers in [`crate::current`], or from
/// a raw block with [`Ref::from_block`]. Dereferencing an empty handle is
/// a contract violation and panics; use [`Ref::get`] to test first.
///
/// Mutable access goes through [`Ref::get_mut`], which only succeeds when
/// this handle is the sole owner of its referent. Values that need to be
/// mutated through shared handles should use interior mutability.
pub struct Ref<'a, T: ?Sized> {
    block: Block,
    ptr: Option<NonNull<T>>,
    alloc: Option<&'a dyn Allocator>,
    role: Role,
    drop_value: DropFn,
    // Cleared for projected handles, whose pointer was derived from a
    // shared borrow.
    exclusive: bool,
    _owns: PhantomData<T>,
}

impl<'a, T> Ref<'a, T> {
    /// Adopt an initialised block as a value-owning handle.
    ///
    /// An empty block yields an empty handle bound to `alloc`.
    ///
    /// # Safety
    ///
    /// `block` must be empty, or a live block issued by `alloc` that is
    /// large enough and aligned for `T` and holds an initialised `T`.
    /// Ownership of one share of the block passes to the handle.
    pub unsafe fn from_block(block: Block, alloc: &'a dyn Allocator) -> Self {
        // SAFETY: forwarded caller contract.
        unsafe { Self::adopt(block, alloc, Role::Owned) }
    }

    /// Wrap a block as a weak handle that never releases it.
    ///
    /// # Safety
    ///
    /// As for [`Ref::from_block`], and the block must stay live for as
    /// long as the returned handle is dereferenced.
    pub unsafe fn from_block_weak(block: Block, alloc: &'a dyn Allocator) -> Self {
        // SAFETY: forwarded caller contract.
        unsafe { Self::adopt(block, alloc, Role::Weak) }
    }

    unsafe fn adopt(block: Block, alloc: &'a dyn Allocator, role: Role) -> Self {
        contract!(
            block.is_empty()
                || (block.size() >= mem::size_of::<T>()
                    && block.addr() % mem::align_of::<T>() == 0),
            "{block} cannot hold a {}",
            std::any::type_name::<T>()
        );
        Self {
            ptr: block.non_null().map(NonNull::cast),
            block,
            alloc: Some(alloc),
            role,
            drop_value: drop_erased::<T>,
            exclusive: true,
            _owns: PhantomData,
        }
    }

    /// Deep copy into a fresh block from the same provider.
    ///
    /// An empty handle clones to an empty handle. The copy is always
    /// value-owning regardless of this handle's role.
    pub fn try_clone(&self) -> Result<Self, RefError>
    where
        T: Clone,
    {
        match (self.get(), self.alloc) {
            (Some(value), Some(alloc)) => alloc.try_make(value.clone()),
            _ => Ok(Self::empty_in(self.alloc)),
        }
    }

    /// Move the value out, releasing the block.
    ///
    /// Fails with [`RefError::NotUnique`] (returning nothing) if other
    /// owners remain; the handle is left untouched in that case.
    pub fn into_inner(mut self) -> Result<T, RefError> {
        if self.is_empty() {
            return Err(RefError::Empty);
        }
        if !self.is_unique() {
            return Err(RefError::NotUnique);
        }
        let mut block = mem::replace(&mut self.block, Block::EMPTY);
        self.ptr = None;
        self.role = Role::Weak;
        // SAFETY: the handle was the sole owner of an initialised `T`; it is
        // now empty, so the value is read exactly once and the block freed
        // without running the destructor again.
        unsafe {
            let value = block.as_ptr().cast::<T>().read();
            if let Some(alloc) = self.alloc {
                alloc.deallocate(&mut block);
            }
            Ok(value)
        }
    }
}

impl<'a, T: ?Sized> Ref<'a, T> {
    /// An empty, weak handle bound to no provider.
    pub const fn uninit() -> Self {
        Self::empty_in(None)
    }

    const fn empty_in(alloc: Option<&'a dyn Allocator>) -> Self {
        Self {
            block: Block::EMPTY,
            ptr: None,
            alloc,
            role: Role::Weak,
            drop_value: drop_nothing,
            exclusive: true,
            _owns: PhantomData,
        }
    }

    /// Whether the handle points at nothing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ptr.is_none()
    }

    /// The handle's role.
    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    /// The block descriptor, as issued by the provider.
    #[inline]
    pub fn block(&self) -> &Block {
        &self.block
    }

    /// The provider this handle is bound to, if any.
    #[inline]
    pub fn allocator(&self) -> Option<&'a dyn Allocator> {
        self.alloc
    }

    /// Address of the referent, or null if empty.
    #[inline]
    pub fn as_ptr(&self) -> *const T
    where
        T: Sized,
    {
        self.ptr.map_or(ptr::null(), |p| p.as_ptr().cast_const())
    }

    /// Whether both handles point at the same referent.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        !a.is_empty() && a.block.same_address(&b.block)
    }

    /// Shared reference to the referent, or `None` if empty.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        // SAFETY: a non-empty handle points at an initialised `T` that stays
        // live at least as long as the handle (owners keep it alive; weak
        // views borrow an owner).
        self.ptr.map(|p| unsafe { p.as_ref() })
    }

    /// Like [`Ref::get`], reporting emptiness as an error.
    pub fn try_get(&self) -> Result<&T, RefError> {
        self.get().ok_or(RefError::Empty)
    }

    /// Whether this handle is the only owner of its referent.
    ///
    /// True for a non-empty, non-weak, unprojected handle whose provider
    /// would free the block if this handle released it.
    pub fn is_unique(&self) -> bool {
        match (self.ptr, self.alloc) {
            // SAFETY: the block is live while the handle is non-empty.
            (Some(_), Some(alloc)) => {
                self.exclusive
                    && self.role.releases()
                    && unsafe { alloc.will_free_on_deallocate(&self.block) }
            }
            _ => false,
        }
    }

    /// Mutable reference to the referent, if this handle is its sole owner.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        if !self.is_unique() {
            return None;
        }
        // SAFETY: no other owner exists and weak views borrow `self`, so
        // `&mut self` excludes every other path to the referent.
        self.ptr.map(|mut p| unsafe { p.as_mut() })
    }

    /// Release the referent and leave the handle empty.
    ///
    /// Owning roles destroy the value if this was the last share and then
    /// hand the block back to the provider. Weak handles just forget the
    /// block. Calling `reset` on an empty handle does nothing.
    pub fn reset(&mut self) {
        let mut block = mem::replace(&mut self.block, Block::EMPTY);
        let role = mem::replace(&mut self.role, Role::Weak);
        let drop_value = mem::replace(&mut self.drop_value, drop_nothing);
        self.ptr = None;
        self.exclusive = true;

        let Some(alloc) = self.alloc else {
            return;
        };
        if !role.releases() || block.is_empty() {
            return;
        }
        // SAFETY: the block was live and owned by this handle; the handle
        // is already empty, so a panicking destructor cannot cause a second
        // release.
        unsafe {
            if alloc.will_free_on_deallocate(&block) {
                drop_value(block.as_ptr());
            }
            alloc.deallocate(&mut block);
        }
    }

    /// Move the referent out, leaving this handle empty.
    pub fn take(&mut self) -> Self {
        let alloc = self.alloc;
        mem::replace(self, Self::empty_in(alloc))
    }

    /// Release the current referent, then take over `other`'s.
    pub fn assign(&mut self, other: Self) {
        self.reset();
        *self = other;
    }

    /// Convert to a shared-owning alias if the provider supports sharing,
    /// otherwise fall back to a weak view. A non-sharing provider reports
    /// the request as a contract violation.
    ///
    /// An empty handle yields an empty weak view.
    pub fn share(&self) -> Alias<'_, 'a, T> {
        if let (Some(alloc), false) = (self.alloc, self.is_empty()) {
            // SAFETY: the block is live while the handle is non-empty.
            let shared = unsafe { alloc.share(&self.block) };
            if shared.has_data() {
                return Alias::Shared(self.alias(shared, Role::Shared));
            }
        }
        Alias::Weak(self.weak())
    }

    /// Like [`Ref::share`], but the fallback to a weak view is reported
    /// again by the handle, on top of the provider's own report.
    pub fn address_of(&self) -> Alias<'_, 'a, T> {
        let alias = self.share();
        if let (Alias::Weak(_), Some(alloc), false) = (&alias, self.alloc, self.is_empty()) {
            contract!(
                false,
                "{}: shared references not supported, making a weak reference",
                alloc.name()
            );
        }
        alias
    }

    /// A weak view of the referent, valid while this handle is borrowed.
    pub fn weak(&self) -> WeakRef<'_, 'a, T> {
        WeakRef::new(self.alias(self.block, Role::Weak))
    }

    fn alias(&self, block: Block, role: Role) -> Ref<'a, T> {
        Ref {
            block,
            ptr: self.ptr,
            alloc: self.alloc,
            role,
            drop_value: self.drop_value,
            exclusive: self.exclusive,
            _owns: PhantomData,
        }
    }

    /// View the referent through a supertype or a part of itself.
    ///
    /// `view` maps the referent to the reference the new handle should
    /// expose, usually an unsizing coercion such as `|d| d as &dyn Trait`.
    /// The returned reference must start at the referent.
    /// The block, provider, role and destructor are carried over unchanged,
    /// so release still destroys the full original value. Projected
    /// handles are read-only: [`Ref::get_mut`] returns `None`.
    pub fn upcast<U, F>(self, view: F) -> Ref<'a, U>
    where
        U: ?Sized,
        F: FnOnce(&T) -> &U,
    {
        let this = ManuallyDrop::new(self);
        // SAFETY: a non-empty handle points at an initialised referent.
        let ptr = this.ptr.map(|p| NonNull::from(view(unsafe { p.as_ref() })));
        contract!(
            ptr.is_none() || ptr.map(|p| p.cast::<u8>()) == this.block.non_null(),
            "upcast view does not start at the referent"
        );
        Ref {
            block: this.block,
            ptr,
            alloc: this.alloc,
            role: this.role,
            drop_value: this.drop_value,
            exclusive: false,
            _owns: PhantomData,
        }
    }

    /// Rebind the handle to another reference to the same provider.
    ///
    /// # Safety
    ///
    /// `alloc` must be the provider that issued this handle's block.
    pub(crate) unsafe fn rebind<'b>(self, alloc: &'b dyn Allocator) -> Ref<'b, T> {
        let this = ManuallyDrop::new(self);
        Ref {
            block: this.block,
            ptr: this.ptr,
            alloc: Some(alloc),
            role: this.role,
            drop_value: this.drop_value,
            exclusive: this.exclusive,
            _owns: PhantomData,
        }
    }
}

impl<T: ?Sized> Deref for Ref<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match self.get() {
            Some(value) => value,
            None => contract::fatal(format_args!("dereference of an empty handle")),
        }
    }
}

impl<T: ?Sized> Drop for Ref<'_, T> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<T: Clone> Clone for Ref<'_, T> {
    fn clone(&self) -> Self {
        expect_alloc(self.try_clone(), Layout::new::<T>())
    }

    fn clone_from(&mut self, source: &Self) {
        self.reset();
        *self = source.clone();
    }
}

impl<T: ?Sized> Default for Ref<'_, T> {
    fn default() -> Self {
        Self::uninit()
    }
}

impl<T: ?Sized + PartialEq> PartialEq for Ref<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Ref<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => f
                .debug_struct("Ref")
                .field("role", &self.role)
                .field("value", &value)
                .finish(),
            None => f.write_str("Ref(empty)"),
        }
    }
}

impl<T: ?Sized + fmt::Display> fmt::Display for Ref<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => value.fmt(f),
            None => f.write_str("<empty>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use allot_alloc::{BumpArena, Heap, RefCounted};
    use std::cell::Cell;
    use std::rc::Rc;

    /// Counts destructor runs.
    #[derive(Clone)]
    struct Tracked {
        value: Cell<u32>,
        drops: Rc<Cell<usize>>,
    }

    impl Tracked {
        fn new(value: u32, drops: &Rc<Cell<usize>>) -> Self {
            Self {
                value: Cell::new(value),
                drops: Rc::clone(drops),
            }
        }
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.drops.set(self.drops.get() + 1);
        }
    }

    trait Speak {
        fn speak(&self) -> u32;
    }

    impl Speak for Tracked {
        fn speak(&self) -> u32 {
            self.value.get()
        }
    }

    #[test]
    fn make_and_read() {
        let heap = Heap::new();
        let r = heap.make(7u64);
        assert_eq!(*r, 7);
        assert_eq!(r.role(), Role::Owned);
        assert_eq!(heap.live_count(), 1);
        drop(r);
        assert_eq!(heap.live_count(), 0);
    }

    #[test]
    fn uninit_is_empty_and_weak() {
        let r: Ref<'_, u32> = Ref::uninit();
        assert!(r.is_empty());
        assert_eq!(r.role(), Role::Weak);
        assert!(r.get().is_none());
        assert_eq!(r.try_get(), Err(RefError::Empty));
        assert!(r.allocator().is_none());
    }

    #[test]
    #[should_panic(expected = "dereference of an empty handle")]
    fn deref_empty_panics() {
        let r: Ref<'_, u32> = Ref::default();
        let _ = *r;
    }

    #[test]
    fn clone_is_a_deep_copy() {
        let drops = Rc::new(Cell::new(0));
        let heap = Heap::new();
        let a = heap.make(Tracked::new(1, &drops));
        let b = a.clone();
        assert!(!Ref::ptr_eq(&a, &b));
        b.value.set(2);
        assert_eq!(a.value.get(), 1);
        assert_eq!(heap.live_count(), 2);
        drop(a);
        drop(b);
        assert_eq!(drops.get(), 2);
        assert_eq!(heap.live_count(), 0);
    }

    #[test]
    fn clone_of_empty_is_empty() {
        let r: Ref<'_, u32> = Ref::uninit();
        assert!(r.clone().is_empty());
    }

    #[test]
    fn clone_from_releases_previous_referent_first() {
        let drops = Rc::new(Cell::new(0));
        let heap = Heap::new();
        let source = heap.make(Tracked::new(5, &drops));
        let mut target = heap.make(Tracked::new(9, &drops));
        target.clone_from(&source);
        assert_eq!(drops.get(), 1);
        assert_eq!(target.value.get(), 5);
        assert_eq!(heap.live_count(), 2);
    }

    #[test]
    fn take_leaves_source_empty() {
        let heap = Heap::new();
        let mut a = heap.make(3u8);
        let b = a.take();
        assert!(a.is_empty());
        assert_eq!(*b, 3);
        assert_eq!(heap.live_count(), 1);
    }

    #[test]
    fn assign_releases_then_adopts() {
        let drops = Rc::new(Cell::new(0));
        let heap = Heap::new();
        let mut a = heap.make(Tracked::new(1, &drops));
        let b = heap.make(Tracked::new(2, &drops));
        a.assign(b);
        assert_eq!(drops.get(), 1);
        assert_eq!(a.value.get(), 2);
        assert_eq!(heap.live_count(), 1);
    }

    #[test]
    fn reset_is_idempotent() {
        let drops = Rc::new(Cell::new(0));
        let heap = Heap::new();
        let mut a = heap.make(Tracked::new(1, &drops));
        a.reset();
        a.reset();
        drop(a);
        assert_eq!(drops.get(), 1);
        assert_eq!(heap.live_count(), 0);
    }

    #[test]
    fn share_without_sharing_support_falls_back_to_weak() {
        let heap = Heap::new();
        let a = heap.make(11u32);
        let alias = a.share();
        assert!(alias.is_weak());
        assert_eq!(*alias, 11);
        drop(alias);
        assert_eq!(heap.live_count(), 1);
    }

    #[cfg(debug_assertions)]
    #[test]
    fn address_of_fallback_is_reported() {
        use allot_alloc::PlainHeap;
        use allot_core::contract::violations;

        let heap = PlainHeap::new();
        let a = heap.make(1u16);
        let before = violations();
        let alias = a.address_of();
        assert!(alias.is_weak());
        assert_eq!(violations(), before + 2);
    }

    #[test]
    fn shared_alias_keeps_referent_alive() {
        let drops = Rc::new(Cell::new(0));
        let rc = RefCounted::new(Heap::new());
        let shared = {
            let owner = rc.make(Tracked::new(4, &drops));
            let alias = owner.share();
            assert!(alias.is_shared());
            alias.into_shared().unwrap()
        };
        assert_eq!(drops.get(), 0);
        assert_eq!(shared.role(), Role::Shared);
        assert_eq!(shared.value.get(), 4);
        drop(shared);
        assert_eq!(drops.get(), 1);
        assert_eq!(rc.live_count(), 0);
    }

    #[test]
    fn get_mut_requires_sole_ownership() {
        let rc = RefCounted::new(Heap::new());
        let mut owner = rc.make(1u32);
        {
            let alias = owner.share().into_shared().unwrap();
            assert!(!owner.is_unique());
            assert_eq!(*alias, 1);
        }
        *owner.get_mut().unwrap() = 2;
        assert_eq!(*owner, 2);
    }

    #[test]
    fn weak_view_never_releases() {
        let drops = Rc::new(Cell::new(0));
        let heap = Heap::new();
        let owner = heap.make(Tracked::new(8, &drops));
        {
            let w = owner.weak();
            assert_eq!(w.role(), Role::Weak);
            assert_eq!(w.value.get(), 8);
        }
        assert_eq!(drops.get(), 0);
        assert_eq!(heap.live_count(), 1);
    }

    #[test]
    fn upcast_destroys_the_original_value() {
        let drops = Rc::new(Cell::new(0));
        let heap = Heap::new();
        let mut speaker: Ref<'_, dyn Speak> =
            heap.make(Tracked::new(3, &drops)).upcast(|t| t as &dyn Speak);
        assert_eq!(speaker.speak(), 3);
        assert!(speaker.get_mut().is_none());
        drop(speaker);
        assert_eq!(drops.get(), 1);
        assert_eq!(heap.live_count(), 0);
    }

    #[cfg(debug_assertions)]
    #[test]
    fn upcast_to_an_inner_field_is_reported() {
        use allot_core::contract::violations;

        #[repr(C)]
        struct Pair {
            head: u32,
            tail: u32,
        }

        let heap = Heap::new();
        let before = violations();
        let head = heap.make(Pair { head: 1, tail: 2 }).upcast(|p| &p.head);
        assert_eq!(violations(), before);
        assert_eq!(*head, 1);

        let tail = heap.make(Pair { head: 3, tail: 4 }).upcast(|p| &p.tail);
        assert_eq!(violations(), before + 1);
        assert_eq!(*tail, 4);
        drop((head, tail));
        assert_eq!(heap.live_count(), 0);
    }

    #[test]
    fn into_inner_moves_value_out() {
        let drops = Rc::new(Cell::new(0));
        let heap = Heap::new();
        let value = heap.make(Tracked::new(6, &drops)).into_inner().unwrap();
        assert_eq!(heap.live_count(), 0);
        assert_eq!(drops.get(), 0);
        drop(value);
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn into_inner_refuses_shared_referent() {
        let rc = RefCounted::new(Heap::new());
        let owner = rc.make(1u8);
        let alias = owner.share().into_shared().unwrap();
        assert_eq!(alias.into_inner(), Err(RefError::NotUnique));
        assert_eq!(rc.live_count(), 1);
    }

    #[test]
    fn arena_handles_release_in_lifo_order() {
        let arena = BumpArena::new();
        {
            let a = arena.make(1u64);
            let b = arena.make([0u8; 5]);
            assert!(arena.used() > 0);
            drop(b);
            drop(a);
        }
        assert_eq!(arena.used(), 0);
        assert_eq!(arena.live_count(), 0);
    }

    #[test]
    fn from_block_adopts_a_raw_block() {
        let heap = Heap::new();
        let block = heap.allocate(Layout::new::<u32>()).unwrap();
        // SAFETY: freshly allocated for a u32 and initialised below.
        let r = unsafe {
            block.as_ptr().cast::<u32>().write(99);
            Ref::<u32>::from_block(block, &heap)
        };
        assert_eq!(*r, 99);
        drop(r);
        assert_eq!(heap.live_count(), 0);
    }

    #[test]
    fn debug_and_display() {
        let heap = Heap::new();
        let r = heap.make(5i32);
        assert_eq!(r.to_string(), "5");
        assert!(format!("{r:?}").contains("Owned"));
        assert_eq!(format!("{:?}", Ref::<i32>::uninit()), "Ref(empty)");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Clone, Copy, Debug)]
        enum Step {
            Share(usize),
            Release(usize),
        }

        fn step() -> impl Strategy<Value = Step> {
            prop_oneof![
                (0usize..8).prop_map(Step::Share),
                (0usize..8).prop_map(Step::Release),
            ]
        }

        proptest! {
            #[test]
            fn destructor_runs_once_at_the_last_release(
                steps in proptest::collection::vec(step(), 1..40),
            ) {
                let drops = Rc::new(Cell::new(0));
                let rc = RefCounted::new(Heap::new());
                let mut pool = vec![rc.make(Tracked::new(9, &drops))];
                for s in steps {
                    match s {
                        Step::Share(i) => {
                            let alias = pool[i % pool.len()].share().into_shared();
                            prop_assert!(alias.is_some());
                            pool.extend(alias);
                        }
                        Step::Release(i) => {
                            if pool.len() > 1 {
                                drop(pool.swap_remove(i % pool.len()));
                            }
                        }
                    }
                    prop_assert_eq!(drops.get(), 0);
                    prop_assert_eq!(pool[0].is_unique(), pool.len() == 1);
                    prop_assert!(pool.iter().all(|r| r.value.get() == 9));
                }
                while let Some(last) = pool.pop() {
                    prop_assert_eq!(drops.get(), 0);
                    drop(last);
                }
                prop_assert_eq!(drops.get(), 1);
                prop_assert_eq!(rc.live_count(), 0);
            }

            #[test]
            fn clone_from_releases_the_old_referent_exactly_once(
                shares in 0usize..5,
                value in any::<u32>(),
            ) {
                let old_drops = Rc::new(Cell::new(0));
                let new_drops = Rc::new(Cell::new(0));
                let rc = RefCounted::new(Heap::new());
                let mut target = rc.make(Tracked::new(0, &old_drops));
                let aliases: Vec<_> = (0..shares)
                    .filter_map(|_| target.share().into_shared())
                    .collect();
                let source = rc.make(Tracked::new(value, &new_drops));
                target.clone_from(&source);
                prop_assert_eq!(target.value.get(), value);
                prop_assert_eq!(old_drops.get(), usize::from(shares == 0));
                drop(aliases);
                prop_assert_eq!(old_drops.get(), 1);
                drop((source, target));
                prop_assert_eq!(new_drops.get(), 2);
                prop_assert_eq!(rc.live_count(), 0);
            }
        }
    }
}
