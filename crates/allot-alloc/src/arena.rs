//! Fixed-capacity bump arena.
//!
//! A [`BumpArena`] is a single pre-allocated byte buffer with a cursor
//! that advances on each allocation. Individual frees only reclaim space
//! when they happen at the tail (LIFO order); anything else stays lost
//! until [`deallocate_all`](Allocator::deallocate_all) resets the arena.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::cell::{Cell, RefCell};
use std::ptr::NonNull;

use smallvec::SmallVec;

use allot_core::traits::non_zero;
use allot_core::{contract, AllocError, Allocator, Block};

use crate::config::ArenaConfig;
use crate::heap::release_one;

/// Where the cursor stood before one allocation.
///
/// Alignment padding sits between `start` and `offset`, so retreating to
/// `start` (not `offset`) on a tail free is what lets a full LIFO unwind
/// bring the cursor back to zero.
#[derive(Clone, Copy, Debug)]
struct Mark {
    start: usize,
    offset: usize,
}

/// Bump allocator over a fixed byte buffer.
///
/// Sharing is unsupported. Dropping the arena while objects are still
/// live, or after frees that were not LIFO, is a contract violation.
pub struct BumpArena {
    /// Backing storage, `capacity` bytes aligned to [`BumpArena::MAX_ALIGN`].
    buffer: NonNull<u8>,
    capacity: usize,
    /// Bump pointer: offset of the next free byte.
    pos: Cell<usize>,
    live: Cell<usize>,
    marks: RefCell<SmallVec<[Mark; 16]>>,
}

impl BumpArena {
    /// Largest alignment the arena can honour (alignment of the buffer base).
    pub const MAX_ALIGN: usize = 64;

    /// Create an arena with the default 4 KiB buffer.
    pub fn new() -> Self {
        Self::with_config(ArenaConfig::default())
    }

    /// Create an arena with a custom configuration.
    ///
    /// # Panics
    ///
    /// Panics if the config fails validation.
    pub fn with_config(config: ArenaConfig) -> Self {
        if let Err(reason) = config.validate() {
            panic!("invalid arena config: {reason}");
        }
        let layout = Self::buffer_layout(config.capacity);
        // SAFETY: validate() guarantees a non-zero capacity. The buffer is
        // zeroed so that no byte handed out is ever uninitialised.
        let ptr = unsafe { std::alloc::alloc_zeroed(layout) };
        let Some(buffer) = NonNull::new(ptr) else {
            std::alloc::handle_alloc_error(layout);
        };
        Self {
            buffer,
            capacity: config.capacity,
            pos: Cell::new(0),
            live: Cell::new(0),
            marks: RefCell::new(SmallVec::new()),
        }
    }

    fn buffer_layout(capacity: usize) -> Layout {
        match Layout::from_size_align(capacity, Self::MAX_ALIGN) {
            Ok(layout) => layout,
            Err(_) => panic!("invalid arena config: capacity {capacity} too large"),
        }
    }

    /// Total capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes between the buffer start and the cursor.
    pub fn used(&self) -> usize {
        self.pos.get()
    }

    /// Bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.capacity - self.pos.get()
    }

    /// Whether `block` lies inside this arena's buffer.
    pub fn owns(&self, block: &Block) -> bool {
        let base = self.buffer.as_ptr() as usize;
        block.has_data() && block.addr() >= base && block.end_addr() <= base + self.capacity
    }
}

impl Default for BumpArena {
    fn default() -> Self {
        Self::new()
    }
}

unsafe impl Allocator for BumpArena {
    fn allocate(&self, layout: Layout) -> Result<Block, AllocError> {
        let layout = non_zero(layout);
        if layout.align() > Self::MAX_ALIGN {
            return Err(AllocError::UnsupportedAlignment {
                align: layout.align(),
                max: Self::MAX_ALIGN,
            });
        }

        // The buffer base is MAX_ALIGN-aligned, so aligning the offset
        // aligns the absolute address.
        let pos = self.pos.get();
        let padding = pos.wrapping_neg() & (layout.align() - 1);
        let exceeded = || AllocError::CapacityExceeded {
            requested: padding.saturating_add(layout.size()),
            remaining: self.capacity - pos,
            capacity: self.capacity,
        };
        let offset = pos.checked_add(padding).ok_or_else(exceeded)?;
        let end = offset.checked_add(layout.size()).ok_or_else(exceeded)?;
        if end > self.capacity {
            return Err(exceeded());
        }

        // SAFETY: offset < end <= capacity, so the pointer stays inside
        // the buffer allocation.
        let ptr = unsafe { self.buffer.add(offset) };
        self.marks.borrow_mut().push(Mark { start: pos, offset });
        self.pos.set(end);
        self.live.set(self.live.get() + 1);
        Ok(Block::new(ptr, layout.size(), layout.align()))
    }

    unsafe fn deallocate(&self, block: &mut Block) {
        if !self.owns(block) {
            contract!(false, "bump arena: deallocate of a block it did not issue ({block})");
            return;
        }
        release_one(&self.live, "bump arena");

        let offset = block.addr() - self.buffer.as_ptr() as usize;
        let mut marks = self.marks.borrow_mut();
        let at_tail = offset + block.size() == self.pos.get()
            && marks.last().is_some_and(|m| m.offset == offset);
        if at_tail {
            if let Some(mark) = marks.pop() {
                self.pos.set(mark.start);
            }
        }
        *block = Block::EMPTY;
    }

    fn deallocate_all(&mut self) {
        self.pos.set(0);
        self.live.set(0);
        self.marks.get_mut().clear();
    }

    unsafe fn will_free_on_deallocate(&self, _block: &Block) -> bool {
        true
    }

    unsafe fn share(&self, _block: &Block) -> Block {
        contract!(false, "bump arena does not support sharing");
        Block::EMPTY
    }

    fn live_count(&self) -> usize {
        self.live.get()
    }

    fn name(&self) -> &'static str {
        "bump-arena"
    }
}

impl Drop for BumpArena {
    fn drop(&mut self) {
        let live = self.live.get();
        contract!(live == 0, "bump arena dropped with {live} live objects");
        if live == 0 {
            let pos = self.pos.get();
            contract!(
                pos == 0,
                "bump arena dropped with cursor at {pos}: blocks were freed out of LIFO order"
            );
        }
        // SAFETY: `buffer` was allocated in with_config with this layout.
        unsafe { std::alloc::dealloc(self.buffer.as_ptr(), Self::buffer_layout(self.capacity)) };
    }
}

impl std::fmt::Debug for BumpArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BumpArena")
            .field("capacity", &self.capacity)
            .field("pos", &self.pos.get())
            .field("live", &self.live.get())
            .finish()
    }
}
