//! Bulk copy to and from card DDR through the XDMA character devices
//!
//! Each transfer opens the engine node, loops until every byte has moved and
//! closes the node again. The file offset of the node is the DDR address.

use crate::config::Config;
use crate::error::{FpgaError, Result};
use crate::io::{self, TransferError};
use bce_chip::xdma::{node_name, Direction};
use std::fmt::Debug;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Anything with card DDR behind it
///
/// Implemented by [`Xdma`]; the stress harness is written against this trait.
pub trait DdrAccess: Debug + Send + Sync {
    /// Copy `data` into DDR at `offset`
    ///
    /// # Errors
    ///
    /// Returns error if the transfer cannot be completed.
    fn write_ddr(&self, offset: u64, data: &[u8]) -> Result<()>;

    /// Fill `buf` from DDR at `offset`
    ///
    /// # Errors
    ///
    /// Returns error if the transfer cannot be completed.
    fn read_ddr(&self, offset: u64, buf: &mut [u8]) -> Result<()>;
}

/// One bulk copy, either direction
#[derive(Debug)]
pub enum Transfer<'a> {
    /// Host buffer to DDR
    ToCard {
        /// DDR destination
        ddr_offset: u64,
        /// Source bytes
        data: &'a [u8],
    },
    /// DDR to host buffer
    FromCard {
        /// DDR source
        ddr_offset: u64,
        /// Destination bytes
        buf: &'a mut [u8],
    },
}

impl Transfer<'_> {
    /// Direction of the copy
    #[must_use]
    pub const fn direction(&self) -> Direction {
        match self {
            Self::ToCard { .. } => Direction::HostToCard,
            Self::FromCard { .. } => Direction::CardToHost,
        }
    }

    /// Bytes moved by the copy
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::ToCard { data, .. } => data.len(),
            Self::FromCard { buf, .. } => buf.len(),
        }
    }

    /// Whether the copy moves nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// DMA engine pair of one card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Xdma {
    h2c: PathBuf,
    c2h: PathBuf,
}

impl Xdma {
    /// Engines of card `slot` on `channel`, under `dev_root`
    #[must_use]
    pub fn new(dev_root: &Path, slot: usize, channel: u32) -> Self {
        Self {
            h2c: dev_root.join(node_name(slot, Direction::HostToCard, channel)),
            c2h: dev_root.join(node_name(slot, Direction::CardToHost, channel)),
        }
    }

    /// Engines of card `slot` as configured
    #[must_use]
    pub fn for_slot(config: &Config, slot: usize) -> Self {
        Self::new(config.dev_root(), slot, config.dma_channel)
    }

    /// Device node used for a direction
    #[must_use]
    pub fn node(&self, direction: Direction) -> &Path {
        match direction {
            Direction::HostToCard => &self.h2c,
            Direction::CardToHost => &self.c2h,
        }
    }

    fn open(&self, direction: Direction) -> Result<File> {
        let path = self.node(direction);
        let mut options = OpenOptions::new();
        match direction {
            Direction::HostToCard => options.write(true),
            Direction::CardToHost => options.read(true),
        };
        options.open(path).map_err(|source| {
            tracing::error!("Fail to open {}: {source}", path.display());
            FpgaError::DeviceNotFound {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    fn map_transfer_error(&self, direction: Direction, err: TransferError) -> FpgaError {
        let path = self.node(direction).to_path_buf();
        match err {
            TransferError::Os { offset, errno } => FpgaError::Dma {
                path,
                offset,
                errno,
            },
            TransferError::Stalled { remaining } => FpgaError::TransferStalled { path, remaining },
        }
    }

    /// Run one copy in either direction
    ///
    /// # Errors
    ///
    /// `DeviceNotFound` if the engine node cannot be opened, `Dma` if a
    /// `pread`/`pwrite` fails, `TransferStalled` if the driver stops making
    /// progress.
    pub fn transfer(&self, transfer: Transfer<'_>) -> Result<()> {
        if transfer.is_empty() {
            return Ok(());
        }

        let direction = transfer.direction();
        let file = self.open(direction)?;

        let result = match transfer {
            Transfer::ToCard { ddr_offset, data } => {
                tracing::trace!("h2c {} bytes -> {ddr_offset:#x}", data.len());
                io::write_all_at(&file, data, ddr_offset)
            }
            Transfer::FromCard { ddr_offset, buf } => {
                tracing::trace!("c2h {} bytes <- {ddr_offset:#x}", buf.len());
                io::read_exact_at(&file, buf, ddr_offset)
            }
        };

        result.map_err(|e| self.map_transfer_error(direction, e))
    }
}

impl DdrAccess for Xdma {
    fn write_ddr(&self, offset: u64, data: &[u8]) -> Result<()> {
        self.transfer(Transfer::ToCard {
            ddr_offset: offset,
            data,
        })
    }

    fn read_ddr(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        self.transfer(Transfer::FromCard {
            ddr_offset: offset,
            buf,
        })
    }
}
