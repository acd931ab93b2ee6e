//! PCI device discovery
//!
//! Scans `<sysfs>/bus/pci/devices/*/` for functions whose `vendor` file
//! matches the Xilinx vendor ID. Any device ID is accepted.

use crate::config::Config;
use crate::error::{FpgaError, Result};
use bce_chip::bar::Bar;
use bce_chip::pcie::XILINX_VENDOR_ID;
use std::path::{Path, PathBuf};

/// A matching PCI function found in sysfs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PciFunction {
    /// PCIe address (0000:a1:00.0, etc.)
    pub address: String,
    /// Vendor ID read from sysfs
    pub vendor_id: u16,
    /// Device ID read from sysfs
    pub device_id: u16,
    /// sysfs directory of the function
    pub sysfs_dir: PathBuf,
}

impl PciFunction {
    /// `vendor:device` in lspci notation
    #[must_use]
    pub fn id_string(&self) -> String {
        format!("{:04x}:{:04x}", self.vendor_id, self.device_id)
    }

    /// Path of the sysfs resource file backing `bar`
    #[must_use]
    pub fn resource_path(&self, bar: Bar) -> PathBuf {
        self.sysfs_dir.join(bar.resource_name())
    }

    /// Enable the function if sysfs says it is disabled
    ///
    /// Equivalent of `echo 1 > .../enable`. Errors are logged and swallowed:
    /// the mapping step reports the real failure if the device stays off.
    pub fn ensure_enabled(&self) {
        let enable_path = self.sysfs_dir.join("enable");

        match std::fs::read_to_string(&enable_path) {
            Ok(content) if content.trim() != "0" => {
                tracing::debug!("Device {} already enabled", self.address);
            }
            Ok(_) => {
                if let Err(e) = std::fs::write(&enable_path, "1") {
                    tracing::warn!("Could not enable device {} (may need root): {e}", self.address);
                } else {
                    tracing::info!("Enabled device {}", self.address);
                }
            }
            Err(e) => {
                tracing::debug!("Cannot check enable state of {}: {e}", self.address);
            }
        }
    }
}

/// Find all Xilinx PCI functions, sorted by address
///
/// # Errors
///
/// Returns `ProbeFailed` if the PCI devices directory cannot be read.
pub fn scan(config: &Config) -> Result<Vec<PciFunction>> {
    let pci_devices_path = config.pci_devices_dir();

    let entries = std::fs::read_dir(&pci_devices_path).map_err(|e| {
        FpgaError::probe_failed(format!(
            "Cannot read {}: {e}",
            pci_devices_path.display()
        ))
    })?;

    let mut matches = Vec::new();

    for entry in entries.flatten() {
        let path = entry.path();

        let Ok(vendor_id) = read_hex_sysfs(&path.join("vendor")) else {
            continue;
        };
        if vendor_id != XILINX_VENDOR_ID {
            continue;
        }

        let device_id = match read_hex_sysfs(&path.join("device")) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("Skipping {}: {e}", path.display());
                continue;
            }
        };

        let address = entry.file_name().to_string_lossy().to_string();
        tracing::debug!("Found {address} ({vendor_id:04x}:{device_id:04x})");

        matches.push(PciFunction {
            address,
            vendor_id,
            device_id,
            sysfs_dir: path,
        });
    }

    // Sort to ensure consistent slot numbering
    matches.sort_by(|a, b| a.address.cmp(&b.address));

    Ok(matches)
}

/// Read a hexadecimal value from sysfs
fn read_hex_sysfs(path: &Path) -> Result<u16> {
    let content = std::fs::read_to_string(path)?;
    parse_hex_u16(&content).ok_or_else(|| {
        FpgaError::probe_failed(format!(
            "Invalid hex value {:?} in {}",
            content.trim(),
            path.display()
        ))
    })
}

fn parse_hex_u16(content: &str) -> Option<u16> {
    let trimmed = content.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    u16::from_str_radix(digits, 16).ok()
}
