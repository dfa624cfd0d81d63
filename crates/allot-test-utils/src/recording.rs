//! An instrumented provider decorator.
//!
//! [`Recording`] forwards every call to an inner provider while keeping a
//! ledger of the blocks it has issued. A deallocation whose descriptor
//! does not match the issued extent exactly is counted as a mismatch
//! instead of being forwarded, so tests can assert that decorators hand
//! back precisely what they were given.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::cell::{Cell, RefCell};

use allot_core::{AllocError, Allocator, Block};
use indexmap::IndexMap;

/// One call observed by a [`Recording`] provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Allocate { addr: usize, size: usize, align: usize },
    Deallocate { addr: usize, size: usize, align: usize },
    Share { addr: usize },
}

/// Provider decorator that records traffic to its inner provider.
pub struct Recording<A: Allocator> {
    inner: A,
    // Issued blocks in allocation order: address -> (size, align).
    issued: RefCell<IndexMap<usize, (usize, usize)>>,
    events: RefCell<Vec<Event>>,
    mismatches: Cell<usize>,
}

impl<A: Allocator> Recording<A> {
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            issued: RefCell::new(IndexMap::new()),
            events: RefCell::new(Vec::new()),
            mismatches: Cell::new(0),
        }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// Every call seen so far, oldest first.
    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    /// Deallocations whose descriptor did not match an issued block.
    pub fn mismatches(&self) -> usize {
        self.mismatches.get()
    }

    /// Extents of the blocks still outstanding, oldest first.
    pub fn outstanding(&self) -> Vec<(usize, usize, usize)> {
        self.issued
            .borrow()
            .iter()
            .map(|(&addr, &(size, align))| (addr, size, align))
            .collect()
    }
}

unsafe impl<A: Allocator> Allocator for Recording<A> {
    fn allocate(&self, layout: Layout) -> Result<Block, AllocError> {
        let block = self.inner.allocate(layout)?;
        self.issued
            .borrow_mut()
            .insert(block.addr(), (block.size(), block.align()));
        self.events.borrow_mut().push(Event::Allocate {
            addr: block.addr(),
            size: block.size(),
            align: block.align(),
        });
        Ok(block)
    }

    unsafe fn deallocate(&self, block: &mut Block) {
        let addr = block.addr();
        let expected = self.issued.borrow().get(&addr).copied();
        if expected != Some((block.size(), block.align())) {
            self.mismatches.set(self.mismatches.get() + 1);
            return;
        }
        self.issued.borrow_mut().shift_remove(&addr);
        self.events.borrow_mut().push(Event::Deallocate {
            addr,
            size: block.size(),
            align: block.align(),
        });
        // SAFETY: the block matches one this decorator forwarded from inner.
        unsafe { self.inner.deallocate(block) };
    }

    fn deallocate_all(&mut self) {
        self.issued.get_mut().clear();
        self.inner.deallocate_all();
    }

    unsafe fn will_free_on_deallocate(&self, block: &Block) -> bool {
        // SAFETY: forwarded caller contract.
        unsafe { self.inner.will_free_on_deallocate(block) }
    }

    unsafe fn share(&self, block: &Block) -> Block {
        self.events
            .borrow_mut()
            .push(Event::Share { addr: block.addr() });
        // SAFETY: forwarded caller contract.
        unsafe { self.inner.share(block) }
    }

    fn live_count(&self) -> usize {
        self.inner.live_count()
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
