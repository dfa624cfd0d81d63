//! Reference-counting adapter over any provider.
//!
//! [`RefCounted`] decorates an inner [`Allocator`] with share semantics.
//! Each allocation reserves one extra `usize` counter word from the inner
//! provider, placed after the payload:
//!
//! ```text
//! payload ptr
//! │
//! ▼
//! ┌────────────────────┬─────────┬──────────────┐
//! │ payload (size)     │ padding │ counter word │
//! └────────────────────┴─────────┴──────────────┘
//! ◄─ round_up(size, align_of::<usize>()) ─►
//! ```
//!
//! The block handed to callers reports only the payload size; the raw
//! extent is restored before the inner provider sees the block again, so
//! the inner provider always gets back exactly what it issued.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::cell::Cell;
use std::mem::{align_of, size_of};

use allot_core::traits::non_zero;
use allot_core::{contract, AllocError, Allocator, Block};

use crate::heap::release_one;

/// Decorator adding a per-block share counter to an inner provider.
///
/// `share` bumps the counter and hands back the same block; `deallocate`
/// drops one share and only releases storage when the last share goes.
/// Counters are plain integers: the adapter is single-threaded.
pub struct RefCounted<A: Allocator> {
    inner: A,
    live: Cell<usize>,
}

impl<A: Allocator> RefCounted<A> {
    /// Wrap `inner`.
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            live: Cell::new(0),
        }
    }

    /// The wrapped provider.
    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// Current share count of `block`.
    ///
    /// # Safety
    ///
    /// `block` must be a live block issued by this adapter.
    pub unsafe fn share_count(&self, block: &Block) -> usize {
        // SAFETY: forwarded caller contract.
        unsafe { counter(block).read() }
    }
}

impl<A: Allocator + Default> Default for RefCounted<A> {
    fn default() -> Self {
        Self::new(A::default())
    }
}

/// Byte offset of the counter word from the payload pointer.
fn counter_offset(size: usize) -> usize {
    size.next_multiple_of(align_of::<usize>())
}

/// The layout requested from the inner provider for a payload layout.
fn raw_layout(layout: Layout) -> Result<Layout, AllocError> {
    let align = layout.align().max(align_of::<usize>());
    let size = counter_offset(layout.size()) + size_of::<usize>();
    Layout::from_size_align(size, align).map_err(|_| AllocError::OutOfMemory { size, align })
}

/// Pointer to the counter word of a live adapter block.
///
/// # Safety
///
/// `block` must be a non-empty block issued by a `RefCounted` adapter.
unsafe fn counter(block: &Block) -> *mut usize {
    // SAFETY: the raw allocation extends at least counter_offset + one
    // word past the payload pointer, and the raw alignment is at least
    // align_of::<usize>(), so the counter is in bounds and aligned.
    unsafe { block.as_ptr().add(counter_offset(block.size())).cast::<usize>() }
}

unsafe impl<A: Allocator> Allocator for RefCounted<A> {
    fn allocate(&self, layout: Layout) -> Result<Block, AllocError> {
        let layout = non_zero(layout);
        let raw = raw_layout(layout)?;
        let block = self.inner.allocate(raw)?.with_extent(layout.size(), layout.align());
        // SAFETY: `block` was just issued with room for the counter word.
        unsafe { counter(&block).write(1) };
        self.live.set(self.live.get() + 1);
        Ok(block)
    }

    unsafe fn deallocate(&self, block: &mut Block) {
        if block.is_empty() {
            contract!(false, "refcounted: deallocate of an empty block");
            return;
        }
        // SAFETY: the caller guarantees `block` is a live block of ours.
        let count = unsafe { counter(block) };
        let n = unsafe { count.read() };
        if n == 0 {
            contract!(false, "refcounted: deallocate of a block with no shares left");
            return;
        }
        // SAFETY: as above.
        unsafe { count.write(n - 1) };

        if n == 1 {
            let Some(raw) = block.layout().and_then(|l| raw_layout(l).ok()) else {
                contract!(false, "refcounted: corrupt block descriptor {block}");
                return;
            };
            block.set_extent(raw.size(), raw.align());
            release_one(&self.live, "refcounted");
            // SAFETY: the block now describes exactly the extent the inner
            // provider issued.
            unsafe { self.inner.deallocate(block) };
        }
        *block = Block::EMPTY;
    }

    fn deallocate_all(&mut self) {
        self.live.set(0);
        self.inner.deallocate_all();
    }

    unsafe fn will_free_on_deallocate(&self, block: &Block) -> bool {
        // SAFETY: forwarded caller contract.
        block.has_data() && unsafe { self.share_count(block) } == 1
    }

    unsafe fn share(&self, block: &Block) -> Block {
        if block.is_empty() {
            return Block::EMPTY;
        }
        // SAFETY: forwarded caller contract.
        unsafe {
            let count = counter(block);
            count.write(count.read() + 1);
        }
        *block
    }

    fn live_count(&self) -> usize {
        self.live.get()
    }

    fn name(&self) -> &'static str {
        "refcounted"
    }
}

impl<A: Allocator> Drop for RefCounted<A> {
    fn drop(&mut self) {
        let live = self.live.get();
        contract!(
            live == 0,
            "refcounted<{}> dropped with {live} live references",
            self.inner.name()
        );
        if live != 0 {
            self.deallocate_all();
        }
    }
}

impl<A: Allocator + std::fmt::Debug> std::fmt::Debug for RefCounted<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefCounted")
            .field("inner", &self.inner)
            .field("live", &self.live.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BumpArena, Heap, PlainHeap};
    use allot_core::contract::violations;

    #[test]
    fn counter_sits_after_word_aligned_payload() {
        assert_eq!(counter_offset(1), size_of::<usize>());
        assert_eq!(counter_offset(8), 8);
        assert_eq!(counter_offset(13), 16);
        let raw = raw_layout(Layout::from_size_align(13, 4).unwrap()).unwrap();
        assert_eq!(raw.size(), 16 + size_of::<usize>());
        assert_eq!(raw.align(), align_of::<usize>());
    }

    #[test]
    fn allocate_reports_payload_size_only() {
        let rc = RefCounted::new(Heap::new());
        let mut block = rc.allocate(Layout::new::<[u8; 12]>()).unwrap();
        assert_eq!(block.size(), 12);
        assert_eq!(block.align(), 1);
        unsafe {
            assert_eq!(rc.share_count(&block), 1);
            rc.deallocate(&mut block);
        }
        assert_eq!(rc.live_count(), 0);
        assert_eq!(rc.inner().live_count(), 0);
    }

    #[test]
    fn share_bumps_count_and_keeps_address() {
        let rc = RefCounted::new(Heap::new());
        let mut a = rc.allocate(Layout::new::<u64>()).unwrap();
        unsafe {
            let mut b = rc.share(&a);
            assert_eq!(a, b);
            assert_eq!(rc.share_count(&a), 2);
            assert!(!rc.will_free_on_deallocate(&a));

            rc.deallocate(&mut b);
            assert!(b.is_empty());
            assert_eq!(rc.share_count(&a), 1);
            assert!(rc.will_free_on_deallocate(&a));
            assert_eq!(rc.live_count(), 1);
            assert_eq!(rc.inner().live_count(), 1);

            rc.deallocate(&mut a);
        }
        assert_eq!(rc.live_count(), 0);
        assert_eq!(rc.inner().live_count(), 0);
    }

    #[test]
    fn payload_writes_do_not_clobber_counter() {
        let rc = RefCounted::new(PlainHeap::new());
        let mut block = rc.allocate(Layout::new::<[u8; 13]>()).unwrap();
        unsafe {
            block.as_ptr().cast::<[u8; 13]>().write([0xff; 13]);
            assert_eq!(rc.share_count(&block), 1);
            rc.deallocate(&mut block);
        }
    }

    #[test]
    fn lifo_over_arena_returns_cursor_to_zero() {
        let before = violations();
        {
            let rc = RefCounted::new(BumpArena::new());
            let mut a = rc.allocate(Layout::new::<u32>()).unwrap();
            let mut b = rc.allocate(Layout::new::<[u8; 3]>()).unwrap();
            assert!(rc.inner().used() > 0);
            unsafe {
                rc.deallocate(&mut b);
                rc.deallocate(&mut a);
            }
            assert_eq!(rc.inner().used(), 0);
            assert_eq!(rc.inner().live_count(), 0);
        }
        assert_eq!(violations(), before);
    }

    #[test]
    fn drop_with_live_blocks_forces_bulk_free() {
        let before = violations();
        {
            let rc = RefCounted::new(BumpArena::new());
            let _leaked = rc.allocate(Layout::new::<u64>()).unwrap();
        }
        // One violation from the adapter; the forced bulk free leaves the
        // arena clean so it reports nothing.
        if cfg!(debug_assertions) {
            assert_eq!(violations(), before + 1);
        }
    }

    #[test]
    fn inner_errors_propagate() {
        let rc = RefCounted::new(PlainHeap::new());
        let err = rc
            .allocate(Layout::from_size_align(8, 64).unwrap())
            .unwrap_err();
        assert_eq!(err, AllocError::UnsupportedAlignment { align: 64, max: 16 });
        assert_eq!(rc.live_count(), 0);
    }

    #[test]
    fn share_of_empty_block_is_empty() {
        let rc = RefCounted::new(Heap::new());
        assert!(unsafe { rc.share(&Block::EMPTY) }.is_empty());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn storage_released_exactly_at_last_share(
                size in 1usize..256,
                extra_shares in 0usize..8,
            ) {
                let rc = RefCounted::new(Heap::new());
                let first = rc.allocate(Layout::from_size_align(size, 8).unwrap()).unwrap();
                let mut shares = vec![first];
                for _ in 0..extra_shares {
                    shares.push(unsafe { rc.share(&first) });
                }
                while let Some(mut b) = shares.pop() {
                    let last = shares.is_empty();
                    prop_assert_eq!(unsafe { rc.will_free_on_deallocate(&b) }, last);
                    unsafe { rc.deallocate(&mut b) };
                    prop_assert_eq!(rc.inner().live_count(), usize::from(!last));
                }
                prop_assert_eq!(rc.live_count(), 0);
            }
        }
    }
}
