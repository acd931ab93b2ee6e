//! Error types for FPGA access operations

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for FPGA operations
pub type Result<T> = std::result::Result<T, FpgaError>;

/// Errors that can occur while probing or accessing a card
#[derive(Debug, Error)]
pub enum FpgaError {
    /// Slot index beyond the device table
    #[error("Slot {slot} out of range (table has {max} slots)")]
    InvalidSlot {
        /// Requested slot
        slot: usize,
        /// Size of the device table
        max: usize,
    },

    /// No card was probed into this slot
    #[error("Slot {slot} is empty")]
    SlotEmpty {
        /// Requested slot
        slot: usize,
    },

    /// Register offset is not 4-byte aligned
    #[error("Register offset {offset:#x} is not 32-bit aligned")]
    Misaligned {
        /// Requested offset
        offset: u64,
    },

    /// Access would fall outside the mapped BAR
    #[error("Offset {offset:#x} out of bounds (limit {limit:#x})")]
    OutOfBounds {
        /// Requested offset
        offset: u64,
        /// Size of the mapping
        limit: usize,
    },

    /// Device node missing or could not be opened
    #[error("Cannot open {path}: {source}")]
    DeviceNotFound {
        /// Node that was opened
        path: PathBuf,
        /// Underlying open error
        source: std::io::Error,
    },

    /// `pread`/`pwrite` on an XDMA node failed
    #[error("DMA on {path} failed at offset {offset:#x}: {errno}")]
    Dma {
        /// Node the transfer ran on
        path: PathBuf,
        /// Card-side offset of the failing chunk
        offset: u64,
        /// OS error
        errno: rustix::io::Errno,
    },

    /// The driver returned 0 bytes while bytes were still pending
    #[error("DMA on {path} stalled with {remaining} bytes remaining")]
    TransferStalled {
        /// Node the transfer ran on
        path: PathBuf,
        /// Bytes not transferred
        remaining: usize,
    },

    /// PCI probing failed
    #[error("Probe failed: {reason}")]
    ProbeFailed {
        /// Reason for failure
        reason: String,
    },

    /// Mapping a BAR failed
    #[error("Cannot map {path}: {reason}")]
    MapFailed {
        /// Resource file that was mapped
        path: PathBuf,
        /// Reason for failure
        reason: String,
    },

    /// Other I/O error
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error
        #[from]
        source: std::io::Error,
    },
}

impl FpgaError {
    /// Create a probe failed error
    pub fn probe_failed(reason: impl Into<String>) -> Self {
        Self::ProbeFailed {
            reason: reason.into(),
        }
    }

    /// Create a map failed error
    pub fn map_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MapFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Negative status code for callers that speak integer return codes.
    ///
    /// `-ENODEV` when the device node could not be opened, the negated OS
    /// error for a failed DMA call, `-1` for everything else.
    #[must_use]
    pub fn errno(&self) -> i32 {
        match self {
            Self::DeviceNotFound { .. } => -rustix::io::Errno::NODEV.raw_os_error(),
            Self::Dma { errno, .. } => -errno.raw_os_error(),
            _ => -1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustix::io::Errno;

    #[test]
    fn test_errno_codes() {
        let missing = FpgaError::DeviceNotFound {
            path: "/dev/xdma0_h2c_0".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(missing.errno(), -Errno::NODEV.raw_os_error());

        let dma = FpgaError::Dma {
            path: "/dev/xdma0_c2h_0".into(),
            offset: 0,
            errno: Errno::IO,
        };
        assert_eq!(dma.errno(), -Errno::IO.raw_os_error());

        assert_eq!(FpgaError::SlotEmpty { slot: 1 }.errno(), -1);
        assert_eq!(FpgaError::InvalidSlot { slot: 9, max: 8 }.errno(), -1);
    }

    #[test]
    fn test_messages() {
        let err = FpgaError::OutOfBounds {
            offset: 0x1000,
            limit: 0x1000,
        };
        assert_eq!(err.to_string(), "Offset 0x1000 out of bounds (limit 0x1000)");
        assert_eq!(
            FpgaError::probe_failed("no sysfs").to_string(),
            "Probe failed: no sysfs"
        );
    }
}
