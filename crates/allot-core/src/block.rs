//! Untyped block descriptors.
//!
//! A [`Block`] describes a piece of raw memory handed out by an
//! [`Allocator`](crate::Allocator). It carries no type information and no
//! ownership: the typed handle layered on top decides what the bytes mean
//! and when they are released.

use std::alloc::Layout;
use std::fmt;
use std::ptr::{self, NonNull};

/// Raw storage descriptor: base address, payload size and alignment.
///
/// `size` is the payload size *as seen by the handle*. A decorating
/// provider may reserve more than that (the refcount adapter hides its
/// counter word) and rewrite the descriptor during bookkeeping.
///
/// Invariant: the address is null if and only if `size == 0`, which is
/// also what "empty" means.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct Block {
    ptr: Option<NonNull<u8>>,
    size: usize,
    align: usize,
}

impl Block {
    /// The empty descriptor: null address, zero size.
    pub const EMPTY: Block = Block {
        ptr: None,
        size: 0,
        align: 1,
    };

    /// Describe `size` bytes at `ptr`, requested with alignment `align`.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero (a non-null block is never empty) or if
    /// `align` is not a power of two.
    pub fn new(ptr: NonNull<u8>, size: usize, align: usize) -> Self {
        assert!(size > 0, "non-empty block with zero size");
        assert!(align.is_power_of_two(), "block alignment {align} is not a power of two");
        Self {
            ptr: Some(ptr),
            size,
            align,
        }
    }

    /// Whether this descriptor points at storage.
    #[inline]
    pub fn has_data(&self) -> bool {
        self.ptr.is_some()
    }

    /// Whether this is the empty descriptor.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ptr.is_none()
    }

    /// Base address, or null for the empty block.
    #[inline]
    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr.map_or(ptr::null_mut(), NonNull::as_ptr)
    }

    /// Base address as a non-null pointer, if any.
    #[inline]
    pub fn non_null(&self) -> Option<NonNull<u8>> {
        self.ptr
    }

    /// Base address as an integer (0 for the empty block).
    #[inline]
    pub fn addr(&self) -> usize {
        self.as_ptr() as usize
    }

    /// One past the last payload byte, as an integer.
    #[inline]
    pub fn end_addr(&self) -> usize {
        self.addr() + self.size
    }

    /// Payload size in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Alignment the block was requested with.
    #[inline]
    pub fn align(&self) -> usize {
        self.align
    }

    /// The layout this block describes, or `None` when empty.
    pub fn layout(&self) -> Option<Layout> {
        if self.is_empty() {
            return None;
        }
        Layout::from_size_align(self.size, self.align).ok()
    }

    /// Rewrite the extent of a non-empty block.
    ///
    /// Used by decorating providers to swap between the size a handle sees
    /// and the size the inner provider issued. Has no effect on an empty
    /// block, which must stay empty.
    pub fn set_extent(&mut self, size: usize, align: usize) {
        if self.is_empty() {
            return;
        }
        debug_assert!(size > 0);
        debug_assert!(align.is_power_of_two());
        self.size = size;
        self.align = align;
    }

    /// Same address, different extent.
    pub fn with_extent(mut self, size: usize, align: usize) -> Self {
        self.set_extent(size, align);
        self
    }

    /// Whether two descriptors share a base address.
    #[inline]
    pub fn same_address(&self, other: &Block) -> bool {
        self.ptr == other.ptr
    }
}

impl Default for Block {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ptr {
            Some(p) => write!(f, "Block({:p}, size={}, align={})", p, self.size, self.align),
            None => write!(f, "Block(empty)"),
        }
    }
}
