//! Test utilities and fixtures for Allot development.
//!
//! Provides value fixtures ([`Duck`], the [`LexerQueue`] word lexer), an
//! instrumented [`Recording`] provider, and [`ProviderKind`] for running
//! the same scenario against every provider configuration.

#![deny(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod recording;

pub use fixtures::{lex_tokens, Duck, Lexer, LexerQueue, Token, TokenKind};
pub use recording::{Event, Recording};

use allot_alloc::{BumpArena, Heap, PlainHeap, RefCounted};
use allot_core::Allocator;

/// The six provider configurations exercised by tests and benchmarks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Heap,
    PlainHeap,
    BumpArena,
    RefCountedHeap,
    RefCountedPlainHeap,
    RefCountedArena,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 6] = [
        ProviderKind::Heap,
        ProviderKind::PlainHeap,
        ProviderKind::BumpArena,
        ProviderKind::RefCountedHeap,
        ProviderKind::RefCountedPlainHeap,
        ProviderKind::RefCountedArena,
    ];

    /// Short label for test output and benchmark ids.
    pub fn label(self) -> &'static str {
        match self {
            ProviderKind::Heap => "heap",
            ProviderKind::PlainHeap => "plain_heap",
            ProviderKind::BumpArena => "bump_arena",
            ProviderKind::RefCountedHeap => "refcounted_heap",
            ProviderKind::RefCountedPlainHeap => "refcounted_plain_heap",
            ProviderKind::RefCountedArena => "refcounted_arena",
        }
    }

    /// Whether handles from this provider can share their referent.
    pub fn shares(self) -> bool {
        matches!(
            self,
            ProviderKind::RefCountedHeap
                | ProviderKind::RefCountedPlainHeap
                | ProviderKind::RefCountedArena
        )
    }

    /// Construct a fresh provider of this kind.
    pub fn build(self) -> Box<dyn Allocator> {
        match self {
            ProviderKind::Heap => Box::new(Heap::new()),
            ProviderKind::PlainHeap => Box::new(PlainHeap::new()),
            ProviderKind::BumpArena => Box::new(BumpArena::new()),
            ProviderKind::RefCountedHeap => Box::new(RefCounted::new(Heap::new())),
            ProviderKind::RefCountedPlainHeap => Box::new(RefCounted::new(PlainHeap::new())),
            ProviderKind::RefCountedArena => Box::new(RefCounted::new(BumpArena::new())),
        }
    }

    /// Construct a provider that lives for the rest of the process, for
    /// installation as the current provider.
    pub fn leak(self) -> &'static dyn Allocator {
        Box::leak(self.build())
    }
}

/// Run `f` once per provider configuration, each with a fresh provider.
pub fn for_each_provider(mut f: impl FnMut(ProviderKind, &dyn Allocator)) {
    for kind in ProviderKind::ALL {
        let alloc = kind.build();
        f(kind, alloc.as_ref());
    }
}
