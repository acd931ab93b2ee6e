//! DMA stress test: N threads hammering private DDR regions of one card.
//!
//! Usage:
//!   dma_check <nthreads> <dma_size> <iteration> [rd|wr]
//!
//! Without a mode word every iteration writes a buffer, reads it back and
//! compares. `rd` / `wr` time one-directional copies instead and print
//! latency and bandwidth.
//!
//! ```text
//! dma_check 4 4096 10000        # correctness, 4 threads, 4 KB
//! dma_check 1 4194304 100 rd    # card-to-host throughput, 4 MB
//! ```

use anyhow::Result;
use bce_bench::{Mode, StressConfig};
use bce_driver::{Config, Xdma};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dma_check", about = "XDMA stress test for BCE FPGA cards", version)]
struct Cli {
    /// Worker threads, each with its own DDR region.
    nthreads: usize,
    /// Bytes per transfer.
    dma_size: usize,
    /// Transfers per thread.
    iteration: u64,
    /// `rd` or `wr` to time one direction; anything else runs the check.
    mode: Option<String>,
    /// Card slot (selects /dev/xdma<slot>_*).
    #[arg(long, default_value_t = 0)]
    slot: usize,
    /// XDMA channel (overrides BCE_DMA_CHANNEL).
    #[arg(long)]
    channel: Option<u32>,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            e.print()?;
            return Ok(ExitCode::from(code));
        }
    };

    let config = StressConfig {
        threads: cli.nthreads,
        dma_size: cli.dma_size,
        iterations: cli.iteration,
        mode: cli.mode.as_deref().map(Mode::from_arg).unwrap_or_default(),
    };
    if let Err(e) = config.validate() {
        eprintln!("{e}");
        return Ok(ExitCode::from(1));
    }

    let mut driver_config = Config::from_env();
    if let Some(channel) = cli.channel {
        driver_config.dma_channel = channel;
    }
    let engine = Xdma::for_slot(&driver_config, cli.slot);

    let summary = bce_bench::run(&engine, &config)?;

    if summary.failed() {
        eprintln!("dma_check FAILED");
        return Ok(ExitCode::from(1));
    }

    eprintln!("dma_check OK");
    if config.mode.is_timed() {
        match summary.throughput() {
            Some(throughput) => println!("{throughput}"),
            None => tracing::warn!("No throughput figures (zero iterations or zero elapsed time)"),
        }
    }

    Ok(ExitCode::SUCCESS)
}
