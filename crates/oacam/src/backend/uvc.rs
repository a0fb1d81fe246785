//! UVC Control Rules
//!
//! UVC processing-unit controls are unsigned 32-bit on the wire and are
//! carried here in 64-bit values.

use super::{CameraFamily, ControlBackend};
use oacam_controls::validator::{check_declared, check_range, check_unsigned, unrecognised};
use oacam_controls::{
    exposure_mode, Control, ControlError, ControlLimits, ControlSet, ControlType, ControlValue,
};
use tracing::warn;

/// USB Video Class cameras
#[derive(Debug, Clone, Copy, Default)]
pub struct UvcBackend;

fn unsigned(min: i64, max: i64, step: i64, default: i64) -> ControlLimits {
    ControlLimits {
        kind: ControlType::Int64,
        min,
        max,
        step,
        default,
    }
}

impl ControlBackend for UvcBackend {
    fn family(&self) -> CameraFamily {
        CameraFamily::Uvc
    }

    fn default_controls(&self) -> ControlSet {
        ControlSet::new()
            .with(Control::Brightness, unsigned(0, 255, 1, 128))
            .with(Control::Contrast, unsigned(0, 255, 1, 32))
            .with(Control::Saturation, unsigned(0, 255, 1, 64))
            .with(Control::Hue, unsigned(0, 255, 1, 0))
            .with(Control::Sharpness, unsigned(0, 255, 1, 2))
            .with(Control::Gamma, unsigned(72, 500, 1, 100))
            .with(Control::WhiteBalanceTemp, unsigned(2800, 6500, 10, 4600))
            .with(Control::Gain, unsigned(0, 255, 1, 0))
            // exposure in 100us units
            .with(Control::ExposureAbsolute, unsigned(1, 5000, 1, 156))
            .with(Control::AutoWhiteBalance, ControlLimits::boolean(true))
            .with(Control::AutoWhiteBalanceTemp, ControlLimits::boolean(true))
            .with(Control::AutoHue, ControlLimits::boolean(false))
            .with(Control::AutoExposurePriority, ControlLimits::boolean(false))
            .with(
                Control::AutoExposure,
                ControlLimits {
                    kind: ControlType::Int32,
                    min: i64::from(exposure_mode::AUTO),
                    max: i64::from(exposure_mode::APERTURE_PRIORITY),
                    step: 1,
                    default: i64::from(exposure_mode::APERTURE_PRIORITY),
                },
            )
    }

    fn validate(
        &self,
        set: &ControlSet,
        control: Control,
        value: &ControlValue,
    ) -> Result<(), ControlError> {
        let limits = check_declared(set, control, value)?;
        let raw = value.as_i64();

        match control {
            Control::Brightness
            | Control::Contrast
            | Control::Saturation
            | Control::Hue
            | Control::Sharpness
            | Control::Gamma
            | Control::WhiteBalanceTemp
            | Control::Gain => check_unsigned(control, raw, limits),

            Control::ExposureAbsolute => {
                if raw <= 0 {
                    return Err(ControlError::OutOfRange {
                        control,
                        value: raw,
                        min: 1,
                        max: i64::MAX,
                        step: 1,
                    });
                }
                Ok(())
            }

            Control::AutoWhiteBalance | Control::AutoWhiteBalanceTemp | Control::AutoHue => Ok(()),

            Control::AutoExposure => {
                let modes = ControlLimits {
                    min: i64::from(exposure_mode::AUTO),
                    max: i64::from(exposure_mode::APERTURE_PRIORITY),
                    step: 1,
                    ..*limits
                };
                check_range(control, raw, &modes)
            }

            Control::Binning => Err(ControlError::invalid_control(control)),

            _ => Err(unrecognised("UVC", control)),
        }
    }

    fn menu_string(&self, control: Control, index: i32) -> &'static str {
        match control {
            Control::AutoExposurePriority => match index {
                0 => "Constant frame rate",
                1 => "Variable frame rate",
                _ => "Unknown",
            },
            Control::AutoExposure => match index {
                1 => "Manual",
                2 => "Auto",
                4 => "Shutter Priority",
                8 => "Aperture Priority",
                _ => "Unknown",
            },
            _ => {
                warn!("UVC: no menu for control {}", control);
                ""
            }
        }
    }
}
