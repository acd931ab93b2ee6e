//! Runtime configuration.
//!
//! Paths default to the real system locations. Each can be redirected through
//! the environment, which is how tests and chroot-style deployments point the
//! driver at a different tree:
//!
//! | Variable | Default |
//! |----------|---------|
//! | `BCE_SYSFS_ROOT` | `/sys` |
//! | `BCE_DEV_ROOT` | `/dev` |
//! | `BCE_DMA_CHANNEL` | `0` |

use bce_chip::xdma::DEFAULT_CHANNEL;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable overriding the sysfs mount point
pub const ENV_SYSFS_ROOT: &str = "BCE_SYSFS_ROOT";
/// Environment variable overriding the device node directory
pub const ENV_DEV_ROOT: &str = "BCE_DEV_ROOT";
/// Environment variable selecting the XDMA channel
pub const ENV_DMA_CHANNEL: &str = "BCE_DMA_CHANNEL";

/// Where to find the PCI subsystem and the XDMA nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// sysfs mount point
    pub sysfs_root: PathBuf,
    /// Directory holding `xdma*` character devices
    pub dev_root: PathBuf,
    /// XDMA channel used for bulk copies
    pub dma_channel: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sysfs_root: PathBuf::from("/sys"),
            dev_root: PathBuf::from("/dev"),
            dma_channel: DEFAULT_CHANNEL,
        }
    }
}

impl Config {
    /// Defaults overridden by `BCE_*` environment variables
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var_os(name))
    }

    /// Defaults overridden by whatever `lookup` returns for each `BCE_*` name
    ///
    /// An unparsable channel is logged and the default kept.
    #[must_use]
    pub fn from_vars(lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        let mut config = Self::default();

        if let Some(root) = lookup(ENV_SYSFS_ROOT) {
            config.sysfs_root = PathBuf::from(root);
        }
        if let Some(root) = lookup(ENV_DEV_ROOT) {
            config.dev_root = PathBuf::from(root);
        }
        if let Some(channel) = lookup(ENV_DMA_CHANNEL) {
            match channel.to_str().map(|c| c.trim().parse::<u32>()) {
                Some(Ok(channel)) => config.dma_channel = channel,
                Some(Err(e)) => tracing::warn!("Ignoring {ENV_DMA_CHANNEL}={channel:?}: {e}"),
                None => tracing::warn!("Ignoring non-UTF-8 {ENV_DMA_CHANNEL}={channel:?}"),
            }
        }

        config
    }

    /// `<sysfs_root>/bus/pci/devices`
    #[must_use]
    pub fn pci_devices_dir(&self) -> PathBuf {
        self.sysfs_root.join("bus/pci/devices")
    }

    /// Directory of one PCI function in sysfs
    #[must_use]
    pub fn pci_device_dir(&self, pcie_address: &str) -> PathBuf {
        self.pci_devices_dir().join(pcie_address)
    }

    /// Device node directory
    #[must_use]
    pub fn dev_root(&self) -> &Path {
        &self.dev_root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let config = Config::default();
        assert_eq!(
            config.pci_device_dir("0000:01:00.0"),
            PathBuf::from("/sys/bus/pci/devices/0000:01:00.0")
        );
        assert_eq!(config.dev_root(), Path::new("/dev"));
        assert_eq!(config.dma_channel, 0);
    }

    fn vars<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<OsString> + 'a {
        move |name: &str| {
            pairs
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| OsString::from(*value))
        }
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_vars(vars(&[
            (ENV_SYSFS_ROOT, "/tmp/sys"),
            (ENV_DEV_ROOT, "/tmp/dev"),
            (ENV_DMA_CHANNEL, " 3\n"),
        ]));
        assert_eq!(
            config,
            Config {
                sysfs_root: PathBuf::from("/tmp/sys"),
                dev_root: PathBuf::from("/tmp/dev"),
                dma_channel: 3,
            }
        );
        assert_eq!(config.pci_devices_dir(), PathBuf::from("/tmp/sys/bus/pci/devices"));
    }

    #[test]
    fn test_bad_channel_keeps_default() {
        let config = Config::from_vars(vars(&[(ENV_DEV_ROOT, "/tmp/dev"), (ENV_DMA_CHANNEL, "two")]));
        assert_eq!(config.dev_root(), Path::new("/tmp/dev"));
        assert_eq!(config.sysfs_root, PathBuf::from("/sys"));
        assert_eq!(config.dma_channel, DEFAULT_CHANNEL);

        let config = Config::from_vars(vars(&[(ENV_DMA_CHANNEL, "-1")]));
        assert_eq!(config.dma_channel, DEFAULT_CHANNEL);
    }

    #[test]
    fn test_no_overrides_is_default() {
        assert_eq!(Config::from_vars(|_| None), Config::default());
    }
}
