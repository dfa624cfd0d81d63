//! Benchmark workloads for the Allot providers.
//!
//! - [`LEX_INPUT`]: the sentence lexed by the lexing benchmark
//! - [`churn_sizes`]: deterministic request sizes via seed
//! - [`lifo_churn`]: allocate a batch, free it in reverse order

#![deny(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::alloc::Layout;

use allot_core::{AllocError, Allocator};
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Input lexed once per iteration of the lexing benchmark.
pub const LEX_INPUT: &str = "this is a lexing test with ref<>s";

/// Generate `n` request sizes in `1..=max` from a seeded ChaCha8 stream.
pub fn churn_sizes(seed: u64, n: usize, max: usize) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| (rng.next_u64() % max as u64) as usize + 1)
        .collect()
}

/// Allocate one block per size, then free them newest first.
///
/// Returns the number of blocks issued.
#[allow(unsafe_code)]
pub fn lifo_churn(alloc: &dyn Allocator, sizes: &[usize]) -> Result<usize, AllocError> {
    let mut blocks = Vec::with_capacity(sizes.len());
    for &size in sizes {
        let layout = Layout::from_size_align(size, 8).map_err(|_| AllocError::OutOfMemory {
            size,
            align: 8,
        })?;
        blocks.push(alloc.allocate(layout)?);
    }
    let issued = blocks.len();
    while let Some(mut block) = blocks.pop() {
        // SAFETY: every block was issued by `alloc` above and is freed once.
        unsafe { alloc.deallocate(&mut block) };
    }
    Ok(issued)
}
