//! Slot-addressed entry points
//!
//! Register accessors go through the process-wide device table; the first
//! call probes the machine (see [`DeviceTable::global`]) and every later call
//! indexes the same table. Bulk copies only need the XDMA nodes and never
//! touch the table, so an unmappable BAR does not block DMA.

use crate::config::Config;
use crate::error::Result;
use crate::table::DeviceTable;
use crate::xdma::{DdrAccess, Transfer, Xdma};

/// Read a 32-bit register in the user-logic space of `slot`
///
/// # Errors
///
/// Returns error if probing fails, the slot is invalid or empty, or `addr`
/// is misaligned or outside BAR2.
pub fn user_reg_read_32(slot: usize, addr: u64) -> Result<u32> {
    DeviceTable::global()?.user_reg_read_32(slot, addr)
}

/// Write a 32-bit register in the user-logic space of `slot`
///
/// # Errors
///
/// Same conditions as [`user_reg_read_32`].
pub fn user_reg_write_32(slot: usize, addr: u64, value: u32) -> Result<()> {
    DeviceTable::global()?.user_reg_write_32(slot, addr, value)
}

/// Read a 32-bit register in the management space of `slot`
///
/// # Errors
///
/// Returns error if probing fails, the slot is invalid or empty, or `addr`
/// is misaligned or outside BAR0.
pub fn mgmt_reg_read_32(slot: usize, addr: u64) -> Result<u32> {
    DeviceTable::global()?.mgmt_reg_read_32(slot, addr)
}

/// Write a 32-bit register in the management space of `slot`
///
/// # Errors
///
/// Same conditions as [`mgmt_reg_read_32`].
pub fn mgmt_reg_write_32(slot: usize, addr: u64, value: u32) -> Result<()> {
    DeviceTable::global()?.mgmt_reg_write_32(slot, addr, value)
}

/// XDMA engines of `slot`, configured from the environment
///
/// The slot only selects the engine node; the XDMA driver owns its own
/// device numbering, so no probing happens here.
#[must_use]
pub fn dma_engine(slot: usize) -> Xdma {
    Xdma::for_slot(&Config::from_env(), slot)
}

/// Copy `data` into DDR of `slot` at `ddr_offset`
///
/// # Errors
///
/// See [`Xdma::transfer`]; [`crate::FpgaError::errno`] gives the integer status.
pub fn dma_write(slot: usize, ddr_offset: u64, data: &[u8]) -> Result<()> {
    dma_engine(slot).write_ddr(ddr_offset, data)
}

/// Fill `buf` from DDR of `slot` at `ddr_offset`
///
/// # Errors
///
/// See [`Xdma::transfer`].
pub fn dma_read(slot: usize, ddr_offset: u64, buf: &mut [u8]) -> Result<()> {
    dma_engine(slot).read_ddr(ddr_offset, buf)
}

/// Bulk copy in the direction given by `transfer`
///
/// # Errors
///
/// See [`Xdma::transfer`].
pub fn memcpy(slot: usize, transfer: Transfer<'_>) -> Result<()> {
    dma_engine(slot).transfer(transfer)
}
