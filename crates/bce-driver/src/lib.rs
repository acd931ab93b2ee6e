//! Userspace access layer for BCE FPGA accelerator cards.
//!
//! Cards are Xilinx PCIe endpoints running the XDMA shell. This crate gives
//! processes four register accessors and a bulk copy:
//!
//! ```text
//! user_reg_read_32 / user_reg_write_32   BAR2  user-logic registers   (mmap)
//! mgmt_reg_read_32 / mgmt_reg_write_32   BAR0  management registers   (mmap)
//! dma_write / dma_read / memcpy          DDR   /dev/xdma<N>_{h2c,c2h}_<C>
//! ```
//!
//! Register access goes through a process-wide [`DeviceTable`], probed from
//! sysfs on first use. Bulk copies go through the XDMA kernel driver's
//! character devices.
//!
//! # Quick start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let version = bce_driver::mgmt_reg_read_32(0, 0x0)?;
//! println!("shell version {version:#010x}");
//!
//! let data = vec![0xA5u8; 4096];
//! bce_driver::dma_write(0, 0, &data)?;
//! let mut back = vec![0u8; 4096];
//! bce_driver::dma_read(0, 0, &mut back)?;
//! assert_eq!(data, back);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

mod api;
mod config;
mod device;
mod discovery;
mod error;
pub mod io;
pub mod mmio;
mod table;
mod xdma;

pub use api::{
    dma_engine, dma_read, dma_write, memcpy, mgmt_reg_read_32, mgmt_reg_write_32,
    user_reg_read_32, user_reg_write_32,
};
pub use config::{Config, ENV_DEV_ROOT, ENV_DMA_CHANNEL, ENV_SYSFS_ROOT};
pub use device::FpgaDevice;
pub use discovery::{scan, PciFunction};
pub use error::{FpgaError, Result};
pub use table::DeviceTable;
pub use xdma::{DdrAccess, Transfer, Xdma};

/// Hardware identification constants (re-exported from bce-chip).
pub mod pcie_ids {
    pub use bce_chip::pcie::{lspci_filter, MAX_SLOTS, XILINX_VENDOR_ID};
}

pub use bce_chip::bar::Bar;
pub use bce_chip::xdma::Direction;
