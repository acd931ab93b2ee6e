//! XDMA character device naming.
//!
//! The XDMA kernel driver creates one node per engine:
//! `/dev/xdma<instance>_h2c_<channel>` (host to card, write) and
//! `/dev/xdma<instance>_c2h_<channel>` (card to host, read). The file offset
//! of a `pread`/`pwrite` is the card-side DDR address.

use std::fmt;

/// Channel used when none is configured.
pub const DEFAULT_CHANNEL: u32 = 0;

/// Transfer direction relative to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Host memory to card DDR.
    HostToCard,
    /// Card DDR to host memory.
    CardToHost,
}

impl Direction {
    /// Short tag used in node names.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::HostToCard => "h2c",
            Self::CardToHost => "c2h",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Device node file name for an engine, e.g. `xdma0_h2c_0`.
#[must_use]
pub fn node_name(instance: usize, direction: Direction, channel: u32) -> String {
    format!("xdma{instance}_{}_{channel}", direction.tag())
}
