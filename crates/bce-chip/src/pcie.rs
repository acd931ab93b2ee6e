//! PCIe identifiers.

/// Xilinx vendor ID (PCI-SIG assigned). Every device id under it matches.
pub const XILINX_VENDOR_ID: u16 = 0x10EE;

/// Number of entries in the device table.
///
/// Matching devices beyond this count are ignored during probing.
pub const MAX_SLOTS: usize = 8;

/// Format a `vendor:` filter for `lspci -d`.
#[must_use]
pub fn lspci_filter() -> String {
    format!("{XILINX_VENDOR_ID:04x}:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lspci_filter() {
        assert_eq!(lspci_filter(), "10ee:");
    }
}
