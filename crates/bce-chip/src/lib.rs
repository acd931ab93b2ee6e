//! Silicon model for BCE FPGA accelerator cards.
//!
//! This crate has **no dependencies** and **no hardware access**. It names the
//! facts the driver and tools share: PCI identifiers, which BAR carries which
//! address space, how the XDMA kernel driver names its character devices, and
//! how the DDR is carved up between stress-test threads.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`pcie`] | Vendor id, slot table size |
//! | [`bar`] | BAR0 management space, BAR2 user-logic space |
//! | [`xdma`] | `h2c` / `c2h` device node naming |
//! | [`ddr`] | Per-thread DDR region layout |

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bar;
pub mod ddr;
pub mod pcie;
pub mod xdma;

pub use pcie::MAX_SLOTS;
