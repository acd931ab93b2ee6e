//! Process-wide device table
//!
//! Slots are filled once, in PCI address order, by [`DeviceTable::probe`].
//! The global instance behind [`DeviceTable::global`] is probed on first use
//! with [`Config::from_env`] and lives until the process exits.

use crate::config::Config;
use crate::device::FpgaDevice;
use crate::discovery;
use crate::error::{FpgaError, Result};
use bce_chip::bar::Bar;
use bce_chip::MAX_SLOTS;
use std::sync::OnceLock;

static GLOBAL: OnceLock<DeviceTable> = OnceLock::new();

/// Fixed-size table of probed cards
#[derive(Debug)]
pub struct DeviceTable {
    slots: [Option<FpgaDevice>; MAX_SLOTS],
    config: Config,
}

impl DeviceTable {
    /// Probe every matching card and map its BARs
    ///
    /// Finding no cards is not an error; the table is simply empty.
    ///
    /// # Errors
    ///
    /// Returns error if sysfs cannot be scanned or any BAR of a matching card
    /// cannot be mapped.
    pub fn probe(config: &Config) -> Result<Self> {
        tracing::info!("Probing FPGA cards under {}", config.sysfs_root.display());

        let mut slots: [Option<FpgaDevice>; MAX_SLOTS] = std::array::from_fn(|_| None);
        let functions = discovery::scan(config)?;

        if functions.len() > MAX_SLOTS {
            tracing::warn!(
                "Found {} cards, only the first {MAX_SLOTS} get a slot",
                functions.len()
            );
        }

        for (slot, function) in functions.into_iter().take(MAX_SLOTS).enumerate() {
            slots[slot] = Some(FpgaDevice::open(slot, function)?);
        }

        let table = Self {
            slots,
            config: config.clone(),
        };

        if table.device_count() == 0 {
            tracing::warn!("No FPGA cards found");
        } else {
            tracing::info!("Probed {} FPGA card(s)", table.device_count());
        }

        Ok(table)
    }

    /// The process-wide table, probed on first call
    ///
    /// # Errors
    ///
    /// Returns the probe error if the table has not been initialised yet and
    /// probing fails. A later call probes again.
    pub fn global() -> Result<&'static Self> {
        if let Some(table) = GLOBAL.get() {
            return Ok(table);
        }
        Self::init(&Config::from_env())
    }

    /// Initialise the process-wide table with an explicit configuration
    ///
    /// If the table already exists it is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns error if probing fails.
    pub fn init(config: &Config) -> Result<&'static Self> {
        if let Some(table) = GLOBAL.get() {
            return Ok(table);
        }
        let table = Self::probe(config)?;
        Ok(GLOBAL.get_or_init(|| table))
    }

    /// Configuration the table was probed with
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Number of occupied slots
    #[must_use]
    pub fn device_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Occupied slots in order
    pub fn devices(&self) -> impl Iterator<Item = &FpgaDevice> {
        self.slots.iter().flatten()
    }

    /// Card in a slot
    ///
    /// # Errors
    ///
    /// `InvalidSlot` if `slot >= MAX_SLOTS`, `SlotEmpty` if nothing was probed there.
    pub fn device(&self, slot: usize) -> Result<&FpgaDevice> {
        self.slots
            .get(slot)
            .ok_or(FpgaError::InvalidSlot {
                slot,
                max: MAX_SLOTS,
            })?
            .as_ref()
            .ok_or(FpgaError::SlotEmpty { slot })
    }

    fn read32(&self, slot: usize, bar: Bar, addr: u64) -> Result<u32> {
        self.device(slot)?.region(bar).read_u32(addr)
    }

    fn write32(&self, slot: usize, bar: Bar, addr: u64, value: u32) -> Result<()> {
        self.device(slot)?.region(bar).write_u32(addr, value)
    }

    /// Read a 32-bit user-logic register (BAR2)
    ///
    /// # Errors
    ///
    /// Returns error if the slot is invalid or empty, or `addr` is misaligned
    /// or outside the BAR.
    pub fn user_reg_read_32(&self, slot: usize, addr: u64) -> Result<u32> {
        self.read32(slot, Bar::User, addr)
    }

    /// Write a 32-bit user-logic register (BAR2)
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::user_reg_read_32`].
    pub fn user_reg_write_32(&self, slot: usize, addr: u64, value: u32) -> Result<()> {
        self.write32(slot, Bar::User, addr, value)
    }

    /// Read a 32-bit management register (BAR0)
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::user_reg_read_32`].
    pub fn mgmt_reg_read_32(&self, slot: usize, addr: u64) -> Result<u32> {
        self.read32(slot, Bar::Management, addr)
    }

    /// Write a 32-bit management register (BAR0)
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::user_reg_read_32`].
    pub fn mgmt_reg_write_32(&self, slot: usize, addr: u64, value: u32) -> Result<()> {
        self.write32(slot, Bar::Management, addr, value)
    }
}
