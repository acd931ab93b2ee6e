//! DDR layout used by the stress harness.
//!
//! Thread `i` of a run with transfer size `n` owns `[n * i, n * (i + 1))`.
//! Regions never overlap, so threads never need to coordinate.

/// Start of the DDR region owned by `thread_index`.
///
/// Returns `None` if the region does not fit in the 64-bit address space.
#[must_use]
pub fn thread_offset(dma_size: u64, thread_index: u64) -> Option<u64> {
    dma_size.checked_mul(thread_index)
}

/// One past the last DDR byte touched by a run of `threads` threads.
#[must_use]
pub fn footprint(dma_size: u64, threads: u64) -> Option<u64> {
    dma_size.checked_mul(threads)
}
