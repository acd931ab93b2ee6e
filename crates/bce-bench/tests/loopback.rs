//! Stress runs against file-backed XDMA nodes
//!
//! `xdma0_c2h_0` is a symlink to `xdma0_h2c_0`, so what the harness writes
//! through the h2c node comes back through the c2h node.

use bce_bench::{run, Mode, StressConfig, StressError};
use bce_chip::xdma::{node_name, Direction};
use bce_driver::{FpgaError, Xdma};
use std::path::Path;

fn loopback(root: &Path) {
    let h2c = root.join(node_name(0, Direction::HostToCard, 0));
    std::fs::File::create(&h2c).unwrap();
    std::os::unix::fs::symlink(&h2c, root.join(node_name(0, Direction::CardToHost, 0))).unwrap();
}

fn config(threads: usize, dma_size: usize, iterations: u64, mode: Mode) -> StressConfig {
    StressConfig {
        threads,
        dma_size,
        iterations,
        mode,
    }
}

#[test]
fn test_check_through_xdma_nodes() {
    let dev = tempfile::tempdir().unwrap();
    loopback(dev.path());
    let engine = Xdma::new(dev.path(), 0, 0);

    let summary = run(&engine, &config(4, 1024, 20, Mode::Check)).unwrap();
    assert!(!summary.failed(), "{:?}", summary.errors().collect::<Vec<_>>());

    let ddr = std::fs::read(dev.path().join("xdma0_h2c_0")).unwrap();
    assert_eq!(ddr.len(), 4 * 1024);
}

#[test]
fn test_write_timing_reports_throughput() {
    let dev = tempfile::tempdir().unwrap();
    loopback(dev.path());
    let engine = Xdma::new(dev.path(), 0, 0);

    let summary = run(&engine, &config(2, 64 * 1024, 50, Mode::Write)).unwrap();
    assert!(!summary.failed());
    let throughput = summary.throughput().expect("timed run");
    assert!(throughput.latency_us > 0.0);
    assert!(throughput.bandwidth_mb_s > 0.0);
}

#[test]
fn test_missing_engine_fails_run() {
    let dev = tempfile::tempdir().unwrap();
    let engine = Xdma::new(dev.path(), 0, 0);

    let summary = run(&engine, &config(2, 16, 3, Mode::Check)).unwrap();
    assert!(summary.failed());
    for err in summary.errors() {
        match err {
            StressError::Dma { source, .. } => {
                assert!(matches!(source, FpgaError::DeviceNotFound { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

#[test]
fn test_read_timing_past_written_ddr_fails() {
    let dev = tempfile::tempdir().unwrap();
    loopback(dev.path());
    let engine = Xdma::new(dev.path(), 0, 0);

    // nothing written yet: a regular file reads short, which the loop reports as a stall
    let summary = run(&engine, &config(1, 32, 1, Mode::Read)).unwrap();
    assert!(summary.failed());
    assert!(summary.errors().all(|e| matches!(
        e,
        StressError::Dma {
            source: FpgaError::TransferStalled { .. },
            ..
        }
    )));
}
