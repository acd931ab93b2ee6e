//! BAR roles.
//!
//! ```text
//! BAR  Role          Contents
//! ──── ───────────── ──────────────────────────────────────────
//!  0   Management    shell / management registers
//!  2   User          user-logic registers of the loaded design
//! ```
//!
//! Both are mapped from `/sys/bus/pci/devices/{addr}/resource{N}`.

use std::fmt;

/// A mapped BAR and the address space it exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Bar {
    /// BAR0, management registers.
    Management = 0,
    /// BAR2, user-logic registers.
    User = 2,
}

impl Bar {
    /// Every BAR the driver maps, in mapping order.
    pub const ALL: [Bar; 2] = [Bar::Management, Bar::User];

    /// PCI BAR index.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Name of the sysfs resource file backing this BAR.
    #[must_use]
    pub fn resource_name(self) -> String {
        format!("resource{}", self.index())
    }
}

impl fmt::Display for Bar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Management => write!(f, "BAR0 (mgmt)"),
            Self::User => write!(f, "BAR2 (user)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_indices() {
        assert_eq!(Bar::Management.index(), 0);
        assert_eq!(Bar::User.index(), 2);
        assert_eq!(Bar::User.resource_name(), "resource2");
    }
}
