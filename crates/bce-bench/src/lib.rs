//! DMA stress and throughput harness for BCE FPGA cards.
//!
//! N worker threads each own a private DDR region of `dma_size` bytes and run
//! one of three [`Mode`]s against any [`bce_driver::DdrAccess`]:
//!
//! | Mode | Per iteration |
//! |------|---------------|
//! | `Check` | stamp, write, read back, compare |
//! | `Read` | one timed card-to-host copy |
//! | `Write` | one timed host-to-card copy |
//!
//! The `dma_check` binary drives this against the XDMA engines of a card.

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod error;
mod report;
mod stress;

pub use error::{Result, StressError};
pub use report::{RunSummary, ThreadOutcome, Throughput};
pub use stress::{run, Mode, StressConfig};
