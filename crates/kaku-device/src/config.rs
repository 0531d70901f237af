//! Device configuration.
//!
//! The output line is a start-up parameter: it is read once, before the
//! line is acquired, and never changes for the lifetime of the device.
//! Configuration is loaded from a JSON file and every field has a default,
//! so an empty object is a valid configuration.
//!
//! ```
//! use kaku_device::DeviceConfig;
//!
//! let config = DeviceConfig::from_json_str(r#"{ "line": 17 }"#).unwrap();
//! assert_eq!(config.line, 17);
//! assert_eq!(config.tolerance_us, 50);
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use kaku_core::constants::{DEFAULT_GPIO_ROOT, DEFAULT_LINE, DEFAULT_TOLERANCE_US, MAX_TOLERANCE_US};
use kaku_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Start-up configuration of the transmitter device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceConfig {
    /// Output line number.
    pub line: u32,

    /// Sysfs GPIO root the line is claimed under.
    pub gpio_root: PathBuf,

    /// Timing tolerance around every hold, in microseconds.
    pub tolerance_us: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            line: DEFAULT_LINE,
            gpio_root: PathBuf::from(DEFAULT_GPIO_ROOT),
            tolerance_us: DEFAULT_TOLERANCE_US,
        }
    }
}

impl DeviceConfig {
    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    /// Returns `Error::Config` on malformed JSON, unknown keys or invalid
    /// values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    ///
    /// # Errors
    /// Returns `Error::Io` if the file cannot be read, `Error::Config` if its
    /// content is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check value ranges.
    ///
    /// # Errors
    /// Returns `Error::Config` if the tolerance exceeds the allowed maximum.
    pub fn validate(&self) -> Result<()> {
        if self.tolerance_us > MAX_TOLERANCE_US {
            return Err(Error::Config(format!(
                "tolerance_us must be at most {MAX_TOLERANCE_US}, got {}",
                self.tolerance_us
            )));
        }
        Ok(())
    }

    /// Timing tolerance as a [`Duration`].
    #[must_use]
    pub fn tolerance(&self) -> Duration {
        Duration::from_micros(self.tolerance_us)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DeviceConfig::default();
        assert_eq!(config.line, 134);
        assert_eq!(config.gpio_root, PathBuf::from("/sys/class/gpio"));
        assert_eq!(config.tolerance(), Duration::from_micros(50));
    }

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(
            DeviceConfig::from_json_str("{}").unwrap(),
            DeviceConfig::default()
        );
    }

    #[test]
    fn test_full_config() {
        let config = DeviceConfig::from_json_str(
            r#"{ "line": 4, "gpio_root": "/tmp/gpio", "tolerance_us": 20 }"#,
        )
        .unwrap();
        assert_eq!(config.line, 4);
        assert_eq!(config.gpio_root, PathBuf::from("/tmp/gpio"));
        assert_eq!(config.tolerance_us, 20);
    }

    #[rstest]
    #[case(r#"{ "line": -1 }"#)]
    #[case(r#"{ "pin": 4 }"#)]
    #[case(r#"{ "tolerance_us": 5000 }"#)]
    #[case("not json")]
    fn test_invalid_config(#[case] json: &str) {
        assert!(matches!(
            DeviceConfig::from_json_str(json),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "line": 21 }}"#).unwrap();

        let config = DeviceConfig::load(file.path()).unwrap();
        assert_eq!(config.line, 21);
    }

    #[test]
    fn test_load_missing_file() {
        let result = DeviceConfig::load("/nonexistent/kakudev.json");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
