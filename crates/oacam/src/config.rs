//! Camera configuration

use crate::backend::{CameraFamily, ControlBackend};
use oacam_controls::{Control, ControlError, ControlLimits, ControlSet, ControlType};
use oacam_transport::SerialConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Prefix for environment overrides, e.g. `OACAM_SERIAL__DEVICE`
const ENV_PREFIX: &str = "OACAM";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File or environment could not be read or parsed
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A limit override is malformed
    #[error("Invalid limit override: {0}")]
    Limits(#[from] ControlError),

    /// Override for a control the camera does not report needs a type
    #[error("Limit override for {0} needs a type")]
    MissingType(Control),

    /// Configuration names a different camera family than the one being opened
    #[error("Configured for {actual} cameras, not {expected}")]
    FamilyMismatch {
        expected: CameraFamily,
        actual: CameraFamily,
    },
}

/// Replacement limits for one control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitOverride {
    /// Control to override
    pub control: Control,
    /// Lowest accepted value
    pub min: i64,
    /// Highest accepted value
    pub max: i64,
    /// Step between accepted values
    #[serde(default = "default_step")]
    pub step: i64,
    /// Value applied at open; keeps the profile default when absent
    #[serde(default)]
    pub default: Option<i64>,
    /// Value type; required only for controls the profile lacks
    #[serde(default)]
    pub kind: Option<ControlType>,
}

fn default_step() -> i64 {
    1
}

/// Camera configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Camera family to drive
    pub family: CameraFamily,

    /// Name of the I/O worker thread
    pub worker_name: String,

    /// Serial link settings (Atik serial cameras)
    pub serial: SerialConfig,

    /// Control limits applied over the model profile
    pub limits: Vec<LimitOverride>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            family: CameraFamily::default(),
            worker_name: "oacam-worker".to_string(),
            serial: SerialConfig::default(),
            limits: Vec::new(),
        }
    }
}

impl CameraConfig {
    /// Atik camera on the given serial device
    pub fn atik_serial(device: &str) -> Self {
        Self {
            family: CameraFamily::AtikSerial,
            worker_name: "oacam-atik".to_string(),
            serial: SerialConfig {
                device: device.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Touptek SDK camera
    pub fn touptek() -> Self {
        Self {
            family: CameraFamily::Touptek,
            worker_name: "oacam-touptek".to_string(),
            ..Default::default()
        }
    }

    /// UVC camera
    pub fn uvc() -> Self {
        Self {
            family: CameraFamily::Uvc,
            worker_name: "oacam-uvc".to_string(),
            ..Default::default()
        }
    }

    /// Load from an optional TOML file, then apply `OACAM_` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            debug!("Loading camera configuration from {}", path.display());
            builder = builder.add_source(config::File::from(path));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Parse a TOML document, without environment overrides
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Require the configured family to be `expected`
    pub fn expect_family(&self, expected: CameraFamily) -> Result<(), ConfigError> {
        if self.family != expected {
            return Err(ConfigError::FamilyMismatch {
                expected,
                actual: self.family,
            });
        }
        Ok(())
    }

    /// Build the control set for a camera: backend profile plus overrides
    pub fn control_set(&self, backend: &dyn ControlBackend) -> Result<ControlSet, ConfigError> {
        let mut set = backend.default_controls();

        for entry in &self.limits {
            let profile = set.get(entry.control).copied();
            let kind = entry
                .kind
                .or(profile.map(|l| l.kind))
                .ok_or(ConfigError::MissingType(entry.control))?;
            let default = entry
                .default
                .or(profile.map(|l| l.default))
                .unwrap_or(entry.min);

            let limits = ControlLimits::new(kind, entry.min, entry.max, entry.step, default)?;
            debug!(
                "Overriding {} limits: {}..={} step {}",
                entry.control, limits.min, limits.max, limits.step
            );
            set.insert(entry.control, limits);
        }

        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::TouptekBackend;

    #[test]
    fn test_default_config() {
        let config = CameraConfig::default();
        assert_eq!(config.family, CameraFamily::Uvc);
        assert_eq!(config.serial.baud_rate, 115_200);
        assert!(config.limits.is_empty());
    }

    #[test]
    fn test_presets() {
        let atik = CameraConfig::atik_serial("/dev/ttyACM1");
        assert_eq!(atik.family, CameraFamily::AtikSerial);
        assert_eq!(atik.serial.device, "/dev/ttyACM1");
        assert_eq!(CameraConfig::touptek().family, CameraFamily::Touptek);
        assert_eq!(CameraConfig::uvc().family, CameraFamily::Uvc);
    }

    #[test]
    fn test_expect_family() {
        assert!(CameraConfig::atik_serial("/dev/ttyUSB0")
            .expect_family(CameraFamily::AtikSerial)
            .is_ok());
        assert!(matches!(
            CameraConfig::uvc().expect_family(CameraFamily::AtikSerial),
            Err(ConfigError::FamilyMismatch {
                expected: CameraFamily::AtikSerial,
                actual: CameraFamily::Uvc,
            })
        ));
    }

    #[test]
    fn test_toml_overrides() {
        let config = CameraConfig::from_toml_str(
            r#"
            family = "touptek"
            worker_name = "guide-camera"

            [serial]
            baud_rate = 9600

            [[limits]]
            control = "Gain"
            min = 100
            max = 1000
            step = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.family, CameraFamily::Touptek);
        assert_eq!(config.worker_name, "guide-camera");
        assert_eq!(config.serial.baud_rate, 9600);
        assert_eq!(config.serial.device, "/dev/ttyUSB0");
        assert_eq!(config.limits.len(), 1);
        assert_eq!(config.limits[0].control, Control::Gain);
    }

    #[test]
    fn test_override_keeps_profile_type_and_default() {
        let config = CameraConfig {
            limits: vec![LimitOverride {
                control: Control::Gain,
                min: 100,
                max: 1000,
                step: 10,
                default: None,
                kind: None,
            }],
            ..CameraConfig::touptek()
        };

        let set = config.control_set(&TouptekBackend).unwrap();
        let gain = set.get(Control::Gain).unwrap();
        assert_eq!(gain.kind, ControlType::Int32);
        assert_eq!((gain.min, gain.max, gain.step), (100, 1000, 10));
        assert_eq!(gain.default, 100);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let config = CameraConfig {
            limits: vec![LimitOverride {
                control: Control::Gain,
                min: 500,
                max: 100,
                step: 1,
                default: None,
                kind: None,
            }],
            ..CameraConfig::touptek()
        };

        assert!(matches!(
            config.control_set(&TouptekBackend),
            Err(ConfigError::Limits(ControlError::InvalidLimits { .. }))
        ));
    }

    #[test]
    fn test_new_control_needs_type() {
        let mut config = CameraConfig::touptek();
        config.limits.push(LimitOverride {
            control: Control::Sharpness,
            min: 0,
            max: 10,
            step: 1,
            default: None,
            kind: None,
        });
        assert!(matches!(
            config.control_set(&TouptekBackend),
            Err(ConfigError::MissingType(Control::Sharpness))
        ));

        config.limits[0].kind = Some(ControlType::Int32);
        let set = config.control_set(&TouptekBackend).unwrap();
        assert_eq!(set.get(Control::Sharpness).unwrap().default, 0);
    }

    #[test]
    fn test_load_from_environment() {
        std::env::set_var("OACAM_WORKER_NAME", "env-worker");
        let config = CameraConfig::load(None).unwrap();
        std::env::remove_var("OACAM_WORKER_NAME");

        assert_eq!(config.worker_name, "env-worker");
    }
}
