use crate::core::errors::{TrezorError, TrezorResult};
use crate::hardware::trezor::transport::{TREZOR_PRODUCT_ID, TREZOR_VENDOR_ID};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Environment variable naming the device configuration file
pub const CONFIG_ENV: &str = "TREZOR_CONFIG";

/// Device connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// USB vendor id to look for
    #[serde(default = "DeviceConfig::default_vendor_id")]
    pub vendor_id: u16,

    /// USB product id to look for
    #[serde(default = "DeviceConfig::default_product_id")]
    pub product_id: u16,

    /// Read timeout in milliseconds; absent means block until the device answers
    #[serde(default)]
    pub read_timeout_ms: Option<u64>,
}

impl DeviceConfig {
    fn default_vendor_id() -> u16 { TREZOR_VENDOR_ID }
    fn default_product_id() -> u16 { TREZOR_PRODUCT_ID }

    pub fn from_toml_str(content: &str) -> TrezorResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: impl AsRef<Path>) -> TrezorResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            TrezorError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from the file named by `TREZOR_CONFIG`, or fall back to defaults
    pub fn from_env() -> TrezorResult<Self> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.is_empty() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            vendor_id: Self::default_vendor_id(),
            product_id: Self::default_product_id(),
            read_timeout_ms: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DeviceConfig::default();
        assert_eq!(config.vendor_id, 0x1209);
        assert_eq!(config.product_id, 0x53c1);
        assert_eq!(config.read_timeout(), None);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        assert_eq!(DeviceConfig::from_toml_str("").unwrap(), DeviceConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = DeviceConfig::from_toml_str("read_timeout_ms = 2500\n").unwrap();
        assert_eq!(config.vendor_id, 0x1209);
        assert_eq!(config.read_timeout(), Some(Duration::from_millis(2500)));
    }

    #[test]
    fn test_invalid_toml() {
        let err = DeviceConfig::from_toml_str("vendor_id = \"abc\"").unwrap_err();
        assert!(matches!(err, TrezorError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "vendor_id = 4617\nproduct_id = 21441\nread_timeout_ms = 100").unwrap();

        let config = DeviceConfig::load(file.path()).unwrap();
        assert_eq!(config.vendor_id, 0x1209);
        assert_eq!(config.product_id, 0x53c1);
        assert_eq!(config.read_timeout_ms, Some(100));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = DeviceConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(!err.is_retryable());
        assert!(matches!(err, TrezorError::Config(msg) if msg.contains("missing.toml")));
    }
}
