//! The allocator capability set.

#![allow(unsafe_code)]

use std::alloc::Layout;

use crate::block::Block;
use crate::error::AllocError;

/// A memory provider.
///
/// Every provider (heap, bump arena, refcount adapter) offers the same
/// five operations, plus two read-only accessors for diagnostics. Typed
/// handles hold a `&dyn Allocator` and route every lifecycle event back
/// through it, so one handle type works over all providers.
///
/// Providers are single-threaded: bookkeeping lives in `Cell`s and all
/// operations take `&self`, except [`deallocate_all`](Allocator::deallocate_all)
/// which needs `&mut self` and therefore cannot run while any handle still
/// borrows the provider.
///
/// # Safety
///
/// Implementors must uphold:
///
/// - A block returned by `allocate` is valid for reads and writes of
///   `block.size()` bytes, aligned to the requested alignment, and does not
///   overlap any other live block.
/// - `will_free_on_deallocate` returns `true` only if no other descriptor
///   returned by `share` for the same referent is still live. Handles use it
///   to decide when handing out `&mut T` and running destructors is sound.
/// - `share` returns either the empty block or a descriptor with the same
///   address and reported size as its argument.
pub unsafe trait Allocator {
    /// Allocate a block for `layout`.
    ///
    /// The returned block's size is the payload size a handle should see.
    /// Zero-sized requests are rounded up to one byte.
    fn allocate(&self, layout: Layout) -> Result<Block, AllocError>;

    /// Release (or drop one share of) `block`.
    ///
    /// The provider may rewrite `block` during bookkeeping. After the call
    /// the block must not be dereferenced through this provider.
    ///
    /// # Safety
    ///
    /// `block` must have been returned by `allocate` or `share` on this
    /// provider and must not have been deallocated already.
    unsafe fn deallocate(&self, block: &mut Block);

    /// Release every block at once, if supported.
    ///
    /// Providers without bulk release report a contract violation.
    fn deallocate_all(&mut self);

    /// Whether the next `deallocate` of `block` will release its storage.
    ///
    /// # Safety
    ///
    /// `block` must be a live block issued by this provider.
    unsafe fn will_free_on_deallocate(&self, block: &Block) -> bool;

    /// Produce an additional co-owning descriptor for the same referent.
    ///
    /// Providers that do not support sharing report a contract violation
    /// and return [`Block::EMPTY`].
    ///
    /// # Safety
    ///
    /// `block` must be a live block issued by this provider.
    unsafe fn share(&self, block: &Block) -> Block;

    /// Number of blocks issued and not yet released.
    fn live_count(&self) -> usize;

    /// Short provider name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Round a layout's size up to at least one byte.
///
/// Every provider funnels requests through this so that a successful
/// allocation never produces the empty descriptor.
pub fn non_zero(layout: Layout) -> Layout {
    if layout.size() == 0 {
        // align is a power of two, so (1, align) is always valid.
        Layout::from_size_align(1, layout.align()).unwrap_or(layout)
    } else {
        layout
    }
}
