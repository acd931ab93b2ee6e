//! Positional I/O loops for XDMA character devices
//!
//! The XDMA driver may complete fewer bytes than requested in one call, so
//! every transfer loops until the whole buffer is done, advancing the card
//! offset by what actually moved.

use rustix::fd::AsFd;
use rustix::io::Errno;

/// A file-like object supporting `pread`/`pwrite`
pub trait PositionalIo {
    /// Read into `buf` at `offset`, returning bytes read
    ///
    /// # Errors
    ///
    /// Returns the OS error of the underlying call.
    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize, Errno>;

    /// Write `buf` at `offset`, returning bytes written
    ///
    /// # Errors
    ///
    /// Returns the OS error of the underlying call.
    fn write_at(&self, buf: &[u8], offset: u64) -> Result<usize, Errno>;
}

impl<T: AsFd> PositionalIo for T {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize, Errno> {
        rustix::io::pread(self, buf, offset)
    }

    fn write_at(&self, buf: &[u8], offset: u64) -> Result<usize, Errno> {
        rustix::io::pwrite(self, buf, offset)
    }
}

/// Why a transfer loop stopped early
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferError {
    /// A call failed; `offset` is where the failing chunk started
    Os {
        /// Card-side offset of the failing call
        offset: u64,
        /// OS error
        errno: Errno,
    },
    /// A call returned 0 with `remaining` bytes still pending
    Stalled {
        /// Bytes not transferred
        remaining: usize,
    },
}

/// Write all of `data` at `offset`, retrying short writes and `EINTR`
///
/// # Errors
///
/// Returns the first non-`EINTR` error, or `Stalled` if a call makes no progress.
pub fn write_all_at<F: PositionalIo + ?Sized>(
    io: &F,
    data: &[u8],
    offset: u64,
) -> Result<(), TransferError> {
    let mut done = 0usize;
    while done < data.len() {
        let at = offset + done as u64;
        match io.write_at(&data[done..], at) {
            Ok(0) => {
                return Err(TransferError::Stalled {
                    remaining: data.len() - done,
                })
            }
            Ok(n) => {
                if n < data.len() - done {
                    tracing::trace!("Short write at {at:#x}: {n} of {}", data.len() - done);
                }
                done += n;
            }
            Err(Errno::INTR) => continue,
            Err(errno) => return Err(TransferError::Os { offset: at, errno }),
        }
    }
    Ok(())
}

/// Fill all of `buf` from `offset`, retrying short reads and `EINTR`
///
/// # Errors
///
/// Returns the first non-`EINTR` error, or `Stalled` if a call makes no progress.
pub fn read_exact_at<F: PositionalIo + ?Sized>(
    io: &F,
    buf: &mut [u8],
    offset: u64,
) -> Result<(), TransferError> {
    let mut done = 0usize;
    while done < buf.len() {
        let at = offset + done as u64;
        match io.read_at(&mut buf[done..], at) {
            Ok(0) => {
                return Err(TransferError::Stalled {
                    remaining: buf.len() - done,
                })
            }
            Ok(n) => {
                if n < buf.len() - done {
                    tracing::trace!("Short read at {at:#x}: {n} of {}", buf.len() - done);
                }
                done += n;
            }
            Err(Errno::INTR) => continue,
            Err(errno) => return Err(TransferError::Os { offset: at, errno }),
        }
    }
    Ok(())
}
