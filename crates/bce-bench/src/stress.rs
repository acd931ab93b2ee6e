//! Worker threads and run modes

use crate::error::{Result, StressError};
use crate::report::{RunSummary, ThreadOutcome};
use bce_chip::ddr;
use bce_driver::{DdrAccess, Direction};
use std::time::{Duration, Instant};

/// What each worker does per iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Write, read back and compare
    #[default]
    Check,
    /// Time card-to-host copies
    Read,
    /// Time host-to-card copies
    Write,
}

impl Mode {
    /// Mode selected by a trailing command-line word
    ///
    /// Anything starting with `rd` or `wr` selects a timing mode; every other
    /// word leaves the correctness check on.
    #[must_use]
    pub fn from_arg(arg: &str) -> Self {
        if arg.starts_with("rd") {
            Self::Read
        } else if arg.starts_with("wr") {
            Self::Write
        } else {
            Self::Check
        }
    }

    /// Whether the mode measures throughput
    #[must_use]
    pub const fn is_timed(self) -> bool {
        !matches!(self, Self::Check)
    }
}

/// Parameters of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StressConfig {
    /// Worker thread count
    pub threads: usize,
    /// Bytes per transfer, and size of each worker's DDR region
    pub dma_size: usize,
    /// Transfers per worker
    pub iterations: u64,
    /// Run mode
    pub mode: Mode,
}

impl StressConfig {
    /// Reject parameters the harness cannot run
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if `threads` or `dma_size` is zero, or the DDR regions
    /// do not fit in a 64-bit address.
    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(StressError::invalid_config("threads must be at least 1"));
        }
        if self.dma_size == 0 {
            return Err(StressError::invalid_config("dma_size must be at least 1"));
        }
        ddr::footprint(self.dma_size as u64, self.threads as u64).ok_or_else(|| {
            StressError::invalid_config(format!(
                "{} threads x {} bytes exceeds the DDR address space",
                self.threads, self.dma_size
            ))
        })?;
        Ok(())
    }

    fn region(&self, thread: usize) -> u64 {
        // validate() checked dma_size * threads fits
        ddr::thread_offset(self.dma_size as u64, thread as u64).unwrap_or(u64::MAX)
    }
}

/// Run all workers to completion against `ddr`
///
/// Workers run independently; a failing worker stops itself and the others
/// carry on. The summary records every worker's outcome.
///
/// # Errors
///
/// Returns `InvalidConfig` if the configuration is rejected by
/// [`StressConfig::validate`]. Worker failures are reported in the summary.
pub fn run<D: DdrAccess + ?Sized>(ddr: &D, config: &StressConfig) -> Result<RunSummary> {
    config.validate()?;

    tracing::info!(
        "Starting {} thread(s), {} bytes x {} iterations, mode {:?}",
        config.threads,
        config.dma_size,
        config.iterations,
        config.mode
    );

    let outcomes = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..config.threads)
            .map(|thread| scope.spawn(move || worker(ddr, config, thread)))
            .collect();

        handles
            .into_iter()
            .enumerate()
            .map(|(thread, handle)| {
                let result = handle
                    .join()
                    .unwrap_or(Err(StressError::Panicked { thread }));
                if let Err(e) = &result {
                    tracing::error!("{e}");
                }
                ThreadOutcome {
                    thread,
                    ddr_offset: config.region(thread),
                    result,
                }
            })
            .collect()
    });

    Ok(RunSummary::new(config.clone(), outcomes))
}

/// One worker; returns elapsed time for timed modes
#[allow(clippy::cast_possible_truncation)]
fn worker<D: DdrAccess + ?Sized>(
    ddr: &D,
    config: &StressConfig,
    thread: usize,
) -> Result<Option<Duration>> {
    let offset = config.region(thread);
    let mut to_fpga = vec![0u8; config.dma_size];
    let mut from_fpga = vec![0u8; config.dma_size];

    // thread-specific fill so neighbouring regions never look alike
    for (j, byte) in to_fpga.iter_mut().enumerate() {
        *byte = (j as u8) ^ (thread as u8);
    }

    tracing::debug!("thread {thread}: region {offset:#x}+{:#x}", config.dma_size);

    let to_card = |iteration, source| StressError::Dma {
        thread,
        iteration,
        direction: Direction::HostToCard,
        source,
    };
    let from_card = |iteration, source| StressError::Dma {
        thread,
        iteration,
        direction: Direction::CardToHost,
        source,
    };

    match config.mode {
        Mode::Read => {
            let start = Instant::now();
            for i in 0..config.iterations {
                ddr.read_ddr(offset, &mut from_fpga)
                    .map_err(|e| from_card(i, e))?;
            }
            Ok(Some(start.elapsed()))
        }
        Mode::Write => {
            let start = Instant::now();
            for i in 0..config.iterations {
                ddr.write_ddr(offset, &to_fpga).map_err(|e| to_card(i, e))?;
            }
            Ok(Some(start.elapsed()))
        }
        Mode::Check => {
            let last = config.dma_size - 1;
            for i in 0..config.iterations {
                to_fpga[0] = i as u8;
                to_fpga[last] = i.wrapping_add(1) as u8;

                ddr.write_ddr(offset, &to_fpga).map_err(|e| to_card(i, e))?;
                ddr.read_ddr(offset, &mut from_fpga)
                    .map_err(|e| from_card(i, e))?;

                if let Some(first_diff) = to_fpga.iter().zip(&from_fpga).position(|(a, b)| a != b) {
                    return Err(StressError::Mismatch {
                        thread,
                        iteration: i,
                        first_diff,
                    });
                }
            }
            Ok(None)
        }
    }
}
