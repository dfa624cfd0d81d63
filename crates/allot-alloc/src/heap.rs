//! General-purpose heap providers.
//!
//! [`Heap`] honours every requested alignment through the global
//! allocator. [`PlainHeap`] goes straight to the system `malloc` and
//! ignores the requested alignment, handing out every block at the fixed
//! alignment `malloc` guarantees. Neither supports sharing or bulk release.

#![allow(unsafe_code)]

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::ptr::NonNull;

use allot_core::traits::non_zero;
use allot_core::{contract, AllocError, Allocator, Block};

/// Aligned heap provider backed by the global allocator.
///
/// Every deallocation releases storage; sharing is unsupported: it is
/// reported as a contract violation and returns the empty block.
#[derive(Debug, Default)]
pub struct Heap {
    live: Cell<usize>,
}

impl Heap {
    /// Create a heap provider.
    pub fn new() -> Self {
        Self::default()
    }
}

unsafe impl Allocator for Heap {
    fn allocate(&self, layout: Layout) -> Result<Block, AllocError> {
        let layout = non_zero(layout);
        // SAFETY: non_zero guarantees a non-zero size.
        let ptr = unsafe { std::alloc::alloc(layout) };
        let ptr = NonNull::new(ptr).ok_or(AllocError::OutOfMemory {
            size: layout.size(),
            align: layout.align(),
        })?;
        self.live.set(self.live.get() + 1);
        Ok(Block::new(ptr, layout.size(), layout.align()))
    }

    unsafe fn deallocate(&self, block: &mut Block) {
        let (Some(ptr), Some(layout)) = (block.non_null(), block.layout()) else {
            contract!(false, "heap: deallocate of an empty block");
            return;
        };
        // SAFETY: the caller guarantees `block` came from `allocate`, which
        // used exactly this layout.
        unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) };
        release_one(&self.live, "heap");
        *block = Block::EMPTY;
    }

    fn deallocate_all(&mut self) {
        contract!(false, "heap does not support deallocate_all");
    }

    unsafe fn will_free_on_deallocate(&self, _block: &Block) -> bool {
        true
    }

    unsafe fn share(&self, _block: &Block) -> Block {
        contract!(false, "heap does not support sharing");
        Block::EMPTY
    }

    fn live_count(&self) -> usize {
        self.live.get()
    }

    fn name(&self) -> &'static str {
        "heap"
    }
}

/// Heap provider backed directly by the system `malloc`.
///
/// The requested alignment is ignored: every block is aligned to
/// [`PlainHeap::ALIGN`], the guarantee `malloc` gives for any size.
/// Requests that need more than that are refused rather than served
/// misaligned.
#[derive(Debug, Default)]
pub struct PlainHeap {
    live: Cell<usize>,
}

impl PlainHeap {
    /// Alignment of every block this provider hands out.
    pub const ALIGN: usize = 16;

    /// Create a plain heap provider.
    pub fn new() -> Self {
        Self::default()
    }

    fn fixed_layout(size: usize) -> Result<Layout, AllocError> {
        Layout::from_size_align(size, Self::ALIGN).map_err(|_| AllocError::OutOfMemory {
            size,
            align: Self::ALIGN,
        })
    }
}

unsafe impl Allocator for PlainHeap {
    fn allocate(&self, layout: Layout) -> Result<Block, AllocError> {
        if layout.align() > Self::ALIGN {
            return Err(AllocError::UnsupportedAlignment {
                align: layout.align(),
                max: Self::ALIGN,
            });
        }
        let fixed = Self::fixed_layout(non_zero(layout).size())?;
        // SAFETY: `fixed` has a non-zero size.
        let ptr = unsafe { System.alloc(fixed) };
        let ptr = NonNull::new(ptr).ok_or(AllocError::OutOfMemory {
            size: fixed.size(),
            align: fixed.align(),
        })?;
        self.live.set(self.live.get() + 1);
        Ok(Block::new(ptr, fixed.size(), fixed.align()))
    }

    unsafe fn deallocate(&self, block: &mut Block) {
        let Some(ptr) = block.non_null() else {
            contract!(false, "plain heap: deallocate of an empty block");
            return;
        };
        // The descriptor's alignment may have been rewritten by a decorator;
        // this provider always allocated at ALIGN.
        let Ok(fixed) = Self::fixed_layout(block.size()) else {
            contract!(false, "plain heap: corrupt block size {}", block.size());
            return;
        };
        // SAFETY: the caller guarantees `block` came from `allocate`, which
        // used exactly `fixed`.
        unsafe { System.dealloc(ptr.as_ptr(), fixed) };
        release_one(&self.live, "plain heap");
        *block = Block::EMPTY;
    }

    fn deallocate_all(&mut self) {
        contract!(false, "plain heap does not support deallocate_all");
    }

    unsafe fn will_free_on_deallocate(&self, _block: &Block) -> bool {
        true
    }

    unsafe fn share(&self, _block: &Block) -> Block {
        contract!(false, "plain heap does not support sharing");
        Block::EMPTY
    }

    fn live_count(&self) -> usize {
        self.live.get()
    }

    fn name(&self) -> &'static str {
        "plain-heap"
    }
}

/// Decrement a live counter, reporting underflow instead of wrapping.
pub(crate) fn release_one(live: &Cell<usize>, provider: &str) {
    let n = live.get();
    contract!(n > 0, "{provider}: more deallocations than allocations");
    live.set(n.saturating_sub(1));
}
