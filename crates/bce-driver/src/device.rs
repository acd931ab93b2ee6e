//! A probed FPGA card and its mapped BARs

use crate::discovery::PciFunction;
use crate::error::Result;
use crate::mmio::MmapRegion;
use bce_chip::bar::Bar;

/// One card in the device table
///
/// Holds both BAR mappings for as long as the card is in the table.
#[derive(Debug)]
pub struct FpgaDevice {
    slot: usize,
    function: PciFunction,
    mgmt: MmapRegion,
    user: MmapRegion,
}

impl FpgaDevice {
    /// Enable the function and map its management and user BARs
    ///
    /// # Errors
    ///
    /// Returns error if either BAR cannot be mapped.
    pub fn open(slot: usize, function: PciFunction) -> Result<Self> {
        tracing::debug!("Opening {} ({}) as slot {slot}", function.address, function.id_string());

        function.ensure_enabled();

        let mgmt = MmapRegion::map(&function.resource_path(Bar::Management), Bar::Management)?;
        let user = MmapRegion::map(&function.resource_path(Bar::User), Bar::User)?;

        tracing::info!(
            "Slot {slot}: {} ({}) mgmt={:#x} user={:#x}",
            function.address,
            function.id_string(),
            mgmt.size(),
            user.size()
        );

        Ok(Self {
            slot,
            function,
            mgmt,
            user,
        })
    }

    /// Slot index in the table
    #[must_use]
    pub const fn slot(&self) -> usize {
        self.slot
    }

    /// PCIe address
    #[must_use]
    pub fn pcie_address(&self) -> &str {
        &self.function.address
    }

    /// sysfs identity of the card
    #[must_use]
    pub const fn function(&self) -> &PciFunction {
        &self.function
    }

    /// Mapped region for a BAR
    #[must_use]
    pub const fn region(&self, bar: Bar) -> &MmapRegion {
        match bar {
            Bar::Management => &self.mgmt,
            Bar::User => &self.user,
        }
    }
}
