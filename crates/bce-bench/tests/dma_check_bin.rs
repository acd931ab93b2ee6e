//! Exit codes and output of the `dma_check` binary
//!
//! Each run gets its own device directory through `BCE_DEV_ROOT`; the c2h
//! node is a symlink to the h2c node as in `loopback.rs`.

use bce_chip::xdma::{node_name, Direction};
use std::path::Path;
use std::process::{Command, Output};

fn loopback(root: &Path, size: u64) {
    let h2c = root.join(node_name(0, Direction::HostToCard, 0));
    std::fs::File::create(&h2c).unwrap().set_len(size).unwrap();
    std::os::unix::fs::symlink(&h2c, root.join(node_name(0, Direction::CardToHost, 0))).unwrap();
}

fn dma_check(dev_root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dma_check"))
        .args(args)
        .env("BCE_DEV_ROOT", dev_root)
        .env_remove("BCE_DMA_CHANNEL")
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_usage_error_exits_one() {
    let dev = tempfile::tempdir().unwrap();

    let output = dma_check(dev.path(), &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Usage"), "{}", stderr(&output));

    let output = dma_check(dev.path(), &["4", "lots", "10"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_help_exits_zero() {
    let dev = tempfile::tempdir().unwrap();
    let output = dma_check(dev.path(), &["--help"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("nthreads") || stdout(&output).contains("NTHREADS"));
}

#[test]
fn test_zero_threads_or_size_rejected() {
    let dev = tempfile::tempdir().unwrap();
    loopback(dev.path(), 0);

    let output = dma_check(dev.path(), &["0", "16", "1"]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("threads must be at least 1"), "{err}");
    assert!(!err.contains("dma_check OK"));

    let output = dma_check(dev.path(), &["2", "0", "1"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("dma_size must be at least 1"));

    // Nothing was transferred
    assert_eq!(std::fs::metadata(dev.path().join("xdma0_h2c_0")).unwrap().len(), 0);
}

#[test]
fn test_check_run_ok() {
    let dev = tempfile::tempdir().unwrap();
    loopback(dev.path(), 0);

    let output = dma_check(dev.path(), &["2", "64", "3"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert!(stderr(&output).contains("dma_check OK"));
    assert!(stdout(&output).is_empty());
    assert_eq!(std::fs::metadata(dev.path().join("xdma0_h2c_0")).unwrap().len(), 128);
}

#[test]
fn test_missing_engine_fails() {
    let dev = tempfile::tempdir().unwrap();

    let output = dma_check(dev.path(), &["1", "64", "3"]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("dma_check FAILED"), "{err}");
    assert!(!err.contains("dma_check OK"));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_timed_modes_print_throughput() {
    let dev = tempfile::tempdir().unwrap();
    loopback(dev.path(), 2 * 64);

    for mode in ["wr", "rd"] {
        let output = dma_check(dev.path(), &["2", "64", "5", mode]);
        assert_eq!(output.status.code(), Some(0), "{mode}: {}", stderr(&output));
        assert!(stderr(&output).contains("dma_check OK"));

        let out = stdout(&output);
        let line = out.trim_end();
        assert!(line.starts_with("latency = "), "{mode}: {out}");
        assert!(line.contains("us, bandwidth = "), "{mode}: {out}");
        assert!(line.ends_with("MB/s"), "{mode}: {out}");
    }
}
