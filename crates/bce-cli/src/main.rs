//! `bce` — command-line interface for BCE FPGA cards.
//!
//! ```text
//! USAGE:
//!   bce enumerate                               List probed slots
//!   bce user-read  <slot> <addr>                Read a user-logic register (BAR2)
//!   bce user-write <slot> <addr> <value>        Write a user-logic register
//!   bce mgmt-read  <slot> <addr>                Read a management register (BAR0)
//!   bce mgmt-write <slot> <addr> <value>        Write a management register
//!   bce dma-read   <slot> <offset> <len> [--out FILE]
//!   bce dma-write  <slot> <offset> <FILE>
//! ```
//!
//! Numbers are decimal or `0x`-prefixed hexadecimal.

use anyhow::{Context, Result};
use bce_driver::{Bar, DdrAccess, DeviceTable};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bce", about = "BCE FPGA card CLI", version)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List probed cards and their BAR sizes.
    Enumerate,
    /// Read a 32-bit user-logic register.
    UserRead {
        slot: usize,
        #[arg(value_parser = parse_u64)]
        addr: u64,
    },
    /// Write a 32-bit user-logic register.
    UserWrite {
        slot: usize,
        #[arg(value_parser = parse_u64)]
        addr: u64,
        #[arg(value_parser = parse_u32)]
        value: u32,
    },
    /// Read a 32-bit management register.
    MgmtRead {
        slot: usize,
        #[arg(value_parser = parse_u64)]
        addr: u64,
    },
    /// Write a 32-bit management register.
    MgmtWrite {
        slot: usize,
        #[arg(value_parser = parse_u64)]
        addr: u64,
        #[arg(value_parser = parse_u32)]
        value: u32,
    },
    /// Copy card DDR to a file, or hex dump it.
    DmaRead {
        slot: usize,
        #[arg(value_parser = parse_u64)]
        offset: u64,
        #[arg(value_parser = parse_u64)]
        len: u64,
        /// Write raw bytes here instead of dumping to stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Copy a file into card DDR.
    DmaWrite {
        slot: usize,
        #[arg(value_parser = parse_u64)]
        offset: u64,
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Cmd::Enumerate => cmd_enumerate()?,
        Cmd::UserRead { slot, addr } => {
            let value = bce_driver::user_reg_read_32(slot, addr)?;
            println!("{value:#010x}");
        }
        Cmd::UserWrite { slot, addr, value } => bce_driver::user_reg_write_32(slot, addr, value)?,
        Cmd::MgmtRead { slot, addr } => {
            let value = bce_driver::mgmt_reg_read_32(slot, addr)?;
            println!("{value:#010x}");
        }
        Cmd::MgmtWrite { slot, addr, value } => bce_driver::mgmt_reg_write_32(slot, addr, value)?,
        Cmd::DmaRead {
            slot,
            offset,
            len,
            out,
        } => cmd_dma_read(slot, offset, len, out)?,
        Cmd::DmaWrite { slot, offset, file } => cmd_dma_write(slot, offset, &file)?,
    }

    Ok(())
}

fn cmd_enumerate() -> Result<()> {
    let table = DeviceTable::global()?;

    println!("FPGA cards: {}", table.device_count());
    if table.device_count() == 0 {
        println!(
            "  (none; check `lspci -d {}`)",
            bce_driver::pcie_ids::lspci_filter()
        );
        return Ok(());
    }
    println!();

    for device in table.devices() {
        println!(
            "[{}] {} ({})",
            device.slot(),
            device.pcie_address(),
            device.function().id_string()
        );
        for bar in Bar::ALL {
            println!("     {:<12} {}", bar.to_string(), humanize_size(device.region(bar).size()));
        }
    }

    Ok(())
}

fn cmd_dma_read(slot: usize, offset: u64, len: u64, out: Option<PathBuf>) -> Result<()> {
    let len = usize::try_from(len).context("length does not fit in memory")?;
    let mut buf = vec![0u8; len];
    bce_driver::dma_engine(slot).read_ddr(offset, &mut buf)?;

    match out {
        Some(path) => {
            std::fs::write(&path, &buf).with_context(|| format!("writing {}", path.display()))?;
        }
        None => hexdump(&mut std::io::stdout().lock(), offset, &buf)?,
    }
    Ok(())
}

fn cmd_dma_write(slot: usize, offset: u64, file: &Path) -> Result<()> {
    let data = std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    bce_driver::dma_write(slot, offset, &data)?;
    println!("Wrote {} bytes at {offset:#x}", data.len());
    Ok(())
}

fn hexdump(out: &mut impl Write, base: u64, bytes: &[u8]) -> std::io::Result<()> {
    for (i, line) in bytes.chunks(16).enumerate() {
        write!(out, "{:016x}:", base + 16 * i as u64)?;
        for byte in line {
            write!(out, " {byte:02x}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn humanize_size(bytes: usize) -> String {
    if bytes >= 1024 * 1024 * 1024 {
        format!("{} GB", bytes / (1024 * 1024 * 1024))
    } else if bytes >= 1024 * 1024 {
        format!("{} MB", bytes / (1024 * 1024))
    } else if bytes >= 1024 {
        format!("{} KB", bytes / 1024)
    } else {
        format!("{bytes} B")
    }
}

fn parse_u64(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid number {s:?}: {e}"))
}

fn parse_u32(s: &str) -> Result<u32, String> {
    let value = parse_u64(s)?;
    u32::try_from(value).map_err(|_| format!("{s} does not fit in 32 bits"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_u64("4096"), Ok(4096));
        assert_eq!(parse_u64("0x1000"), Ok(4096));
        assert_eq!(parse_u32("0xffffffff"), Ok(u32::MAX));
        assert!(parse_u32("0x100000000").is_err());
        assert!(parse_u64("0xzz").is_err());
    }

    #[test]
    fn test_hexdump() {
        let mut out = Vec::new();
        hexdump(&mut out, 0x100, &(0u8..18).collect::<Vec<_>>()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("0000000000000100: 00 01 02"));
        assert_eq!(lines[1], "0000000000000110: 10 11");
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["bce", "user-write", "0", "0x10", "0xdeadbeef"]).unwrap();
        assert!(matches!(
            cli.command,
            Cmd::UserWrite {
                slot: 0,
                addr: 0x10,
                value: 0xdead_beef
            }
        ));
        assert!(Cli::try_parse_from(["bce", "mgmt-write", "0", "0", "0x1ffffffff"]).is_err());
    }

    #[test]
    fn test_humanize_size() {
        assert_eq!(humanize_size(512), "512 B");
        assert_eq!(humanize_size(64 * 1024), "64 KB");
        assert_eq!(humanize_size(32 * 1024 * 1024), "32 MB");
    }
}
