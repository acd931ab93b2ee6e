//! Memory-mapped BAR regions
//!
//! A BAR is mapped by opening its sysfs `resource<N>` file and `mmap`ing the
//! whole file shared, read/write. Registers are then plain volatile loads and
//! stores at an offset from the mapping base.

use crate::error::{FpgaError, Result};
use bce_chip::bar::Bar;
use rustix::mm::{mmap, munmap, MapFlags, ProtFlags};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

/// Memory-mapped PCIe BAR
///
/// Bounds and alignment are checked on every access; the mapping is released
/// on drop.
#[derive(Debug)]
pub struct MmapRegion {
    ptr: NonNull<u8>,
    size: usize,
    _file: File,
    path: PathBuf,
    bar: Bar,
}

impl MmapRegion {
    /// Map a BAR from its sysfs resource file
    ///
    /// # Errors
    ///
    /// Returns `MapFailed` if the file cannot be opened, is empty, or `mmap`
    /// fails.
    pub fn map(path: &Path, bar: Bar) -> Result<Self> {
        tracing::debug!("Mapping {bar}: {}", path.display());

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| FpgaError::map_failed(path, format!("open: {e}")))?;

        let len = file
            .metadata()
            .map_err(|e| FpgaError::map_failed(path, format!("stat: {e}")))?
            .len();
        let size = usize::try_from(len)
            .map_err(|_| FpgaError::map_failed(path, format!("size {len:#x} exceeds usize")))?;

        if size == 0 {
            return Err(FpgaError::map_failed(path, "BAR size is 0 (device not enabled?)"));
        }

        // SAFETY: the fd was just opened read/write and size is the non-zero
        // length of the file. The file is stored alongside the mapping and the
        // mapping is released in Drop, so ptr stays valid for self.size bytes
        // for the lifetime of self.
        let addr = unsafe {
            mmap(
                std::ptr::null_mut(),
                size,
                ProtFlags::READ | ProtFlags::WRITE,
                MapFlags::SHARED,
                &file,
                0,
            )
        }
        .map_err(|e| FpgaError::map_failed(path, format!("mmap: {e}")))?;

        let ptr = NonNull::new(addr.cast::<u8>())
            .ok_or_else(|| FpgaError::map_failed(path, "mmap returned null"))?;

        tracing::debug!("Mapped {bar} at {ptr:p}, size={size:#x}");

        Ok(Self {
            ptr,
            size,
            _file: file,
            path: path.to_path_buf(),
            bar,
        })
    }

    fn check(&self, offset: u64) -> Result<usize> {
        if offset % 4 != 0 {
            return Err(FpgaError::Misaligned { offset });
        }
        match usize::try_from(offset) {
            Ok(start) if start.checked_add(4).is_some_and(|end| end <= self.size) => Ok(start),
            _ => Err(FpgaError::OutOfBounds {
                offset,
                limit: self.size,
            }),
        }
    }

    /// Read 32-bit register at offset
    ///
    /// # Errors
    ///
    /// Returns error if the offset is misaligned or out of bounds.
    pub fn read_u32(&self, offset: u64) -> Result<u32> {
        let start = self.check(offset)?;

        // SAFETY: check() guarantees start is 4-byte aligned and start + 4 <=
        // size, and the mapping base is page aligned, so the pointer is valid
        // and aligned for a u32. Volatile because the hardware owns the value.
        #[allow(clippy::cast_ptr_alignment)]
        let value = unsafe { self.ptr.as_ptr().add(start).cast::<u32>().read_volatile() };

        tracing::trace!("{} read u32 @ {offset:#x} = {value:#x}", self.bar);
        Ok(value)
    }

    /// Write 32-bit register at offset
    ///
    /// Takes `&self`: a register store is a side effect on the device, not a
    /// mutation of this handle.
    ///
    /// # Errors
    ///
    /// Returns error if the offset is misaligned or out of bounds.
    pub fn write_u32(&self, offset: u64, value: u32) -> Result<()> {
        let start = self.check(offset)?;

        tracing::trace!("{} write u32 @ {offset:#x} = {value:#x}", self.bar);

        // SAFETY: as in read_u32, the target is in bounds and aligned.
        #[allow(clippy::cast_ptr_alignment)]
        unsafe {
            self.ptr.as_ptr().add(start).cast::<u32>().write_volatile(value);
        }

        Ok(())
    }

    /// Mapping size in bytes
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Which BAR this is
    #[must_use]
    pub const fn bar(&self) -> Bar {
        self.bar
    }

    /// Resource file backing the mapping
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for MmapRegion {
    fn drop(&mut self) {
        tracing::debug!("Unmapping {} ({})", self.bar, self.path.display());

        // SAFETY: ptr and size are exactly what mmap returned and was given in
        // map(); Drop runs once, so the region is unmapped once.
        unsafe {
            if let Err(e) = munmap(self.ptr.as_ptr().cast(), self.size) {
                tracing::error!("munmap failed during drop: {e}");
            }
        }
    }
}

// SAFETY: the mapping is process-wide and owned exclusively by this value;
// moving it to another thread does not invalidate it.
unsafe impl Send for MmapRegion {}

// SAFETY: every access through &self is a single bounds-checked volatile u32
// load or store. Concurrent accesses to device registers are the hardware's
// concern, as with any MMIO; no Rust-visible state is mutated.
unsafe impl Sync for MmapRegion {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn fake_bar(len: u64) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        file.as_file().set_len(len).unwrap();
        file
    }

    #[test]
    fn test_write_then_read() {
        let backing = fake_bar(4096);
        let region = MmapRegion::map(backing.path(), Bar::User).unwrap();
        assert_eq!(region.size(), 4096);
        assert_eq!(region.bar(), Bar::User);

        region.write_u32(0x10, 0xdead_beef).unwrap();
        assert_eq!(region.read_u32(0x10).unwrap(), 0xdead_beef);
        assert_eq!(region.read_u32(0x14).unwrap(), 0);
    }

    #[test]
    fn test_writes_reach_backing_file() {
        let backing = fake_bar(4096);
        {
            let region = MmapRegion::map(backing.path(), Bar::Management).unwrap();
            region.write_u32(0xffc, 0x0102_0304).unwrap();
        }

        let mut bytes = Vec::new();
        File::open(backing.path())
            .unwrap()
            .read_to_end(&mut bytes)
            .unwrap();
        assert_eq!(&bytes[0xffc..], &0x0102_0304u32.to_ne_bytes());
    }

    #[test]
    fn test_bounds_checking() {
        let backing = fake_bar(4096);
        let region = MmapRegion::map(backing.path(), Bar::User).unwrap();

        assert!(region.read_u32(0xffc).is_ok());
        assert!(matches!(
            region.read_u32(0x1000),
            Err(FpgaError::OutOfBounds { offset: 0x1000, limit: 4096 })
        ));
        assert!(matches!(
            region.write_u32(u64::MAX - 3, 1),
            Err(FpgaError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_misaligned_access() {
        let backing = fake_bar(4096);
        let region = MmapRegion::map(backing.path(), Bar::User).unwrap();

        assert!(matches!(
            region.read_u32(0x2),
            Err(FpgaError::Misaligned { offset: 0x2 })
        ));
        assert!(matches!(
            region.write_u32(0x7, 0),
            Err(FpgaError::Misaligned { .. })
        ));
    }

    #[test]
    fn test_empty_resource_rejected() {
        let backing = fake_bar(0);
        let err = MmapRegion::map(backing.path(), Bar::User).unwrap_err();
        assert!(matches!(err, FpgaError::MapFailed { .. }));
    }

    #[test]
    fn test_missing_resource_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = MmapRegion::map(&dir.path().join("resource2"), Bar::User).unwrap_err();
        assert!(matches!(err, FpgaError::MapFailed { .. }));
    }
}
