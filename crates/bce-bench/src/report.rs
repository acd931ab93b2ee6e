//! Run results and the latency / bandwidth report

use crate::error::StressError;
use crate::stress::StressConfig;
use std::fmt;
use std::time::Duration;

/// How one worker ended
#[derive(Debug)]
pub struct ThreadOutcome {
    /// Worker index
    pub thread: usize,
    /// Start of the worker's DDR region
    pub ddr_offset: u64,
    /// Elapsed time for timed modes, `None` for the correctness check
    pub result: Result<Option<Duration>, StressError>,
}

/// Mean per-transfer latency and per-thread bandwidth of a timed run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Throughput {
    /// Microseconds per transfer, averaged over threads
    pub latency_us: f64,
    /// Bytes per microsecond (decimal MB/s) seen by one thread
    pub bandwidth_mb_s: f64,
}

impl Throughput {
    /// Compute from the summed elapsed time of all threads
    ///
    /// `latency = total / threads / iterations`,
    /// `bandwidth = dma_size * iterations / (total / threads)`.
    /// Returns `None` when either figure would divide by zero.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_total(total: Duration, threads: usize, dma_size: usize, iterations: u64) -> Option<Self> {
        let total_us = total.as_secs_f64() * 1e6;
        if threads == 0 || iterations == 0 || total_us <= 0.0 {
            return None;
        }

        let per_thread_us = total_us / threads as f64;
        Some(Self {
            latency_us: per_thread_us / iterations as f64,
            bandwidth_mb_s: (dma_size as f64 * iterations as f64) / per_thread_us,
        })
    }
}

impl fmt::Display for Throughput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "latency = {:.2}us, bandwidth = {:.2}MB/s",
            self.latency_us, self.bandwidth_mb_s
        )
    }
}

/// Outcome of a whole run
#[derive(Debug)]
pub struct RunSummary {
    config: StressConfig,
    outcomes: Vec<ThreadOutcome>,
}

impl RunSummary {
    pub(crate) fn new(config: StressConfig, outcomes: Vec<ThreadOutcome>) -> Self {
        Self { config, outcomes }
    }

    /// Parameters of the run
    #[must_use]
    pub const fn config(&self) -> &StressConfig {
        &self.config
    }

    /// Per-thread outcomes, in thread order
    #[must_use]
    pub fn outcomes(&self) -> &[ThreadOutcome] {
        &self.outcomes
    }

    /// Whether any thread hit an error or a data mismatch
    #[must_use]
    pub fn failed(&self) -> bool {
        self.outcomes.iter().any(|o| o.result.is_err())
    }

    /// Errors of the failed threads
    pub fn errors(&self) -> impl Iterator<Item = &StressError> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().err())
    }

    /// Sum of elapsed time over all threads of a timed run
    #[must_use]
    pub fn total_elapsed(&self) -> Duration {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().copied().flatten())
            .sum()
    }

    /// Latency and bandwidth, for a timed run where every thread succeeded
    #[must_use]
    pub fn throughput(&self) -> Option<Throughput> {
        if !self.config.mode.is_timed() || self.failed() {
            return None;
        }
        Throughput::from_total(
            self.total_elapsed(),
            self.config.threads,
            self.config.dma_size,
            self.config.iterations,
        )
    }
}
