//! Touptek Control Rules

use super::{CameraFamily, ControlBackend};
use oacam_controls::validator::{check_binning, check_declared, check_range, unrecognised};
use oacam_controls::{
    Control, ControlError, ControlLimits, ControlSet, ControlType, ControlValue, FrameSize,
    FrameSizes,
};
use tracing::warn;

/// SDK-defined ranges: (min, max, default)
const BRIGHTNESS: (i64, i64, i64) = (-64, 64, 0);
const CONTRAST: (i64, i64, i64) = (-100, 100, 0);
const GAMMA: (i64, i64, i64) = (20, 180, 100);
const HUE: (i64, i64, i64) = (-180, 180, 0);
const SATURATION: (i64, i64, i64) = (0, 255, 128);
const WB_GAIN: (i64, i64, i64) = (-127, 127, 0);

/// LED states in menu order
const LED_ON: i32 = 1;
const LED_FLASH: i32 = 2;
const LED_OFF: i32 = 3;

/// Touptek SDK cameras
#[derive(Debug, Clone, Copy, Default)]
pub struct TouptekBackend;

fn int32((min, max, default): (i64, i64, i64)) -> ControlLimits {
    ControlLimits {
        kind: ControlType::Int32,
        min,
        max,
        step: 1,
        default,
    }
}

impl ControlBackend for TouptekBackend {
    fn family(&self) -> CameraFamily {
        CameraFamily::Touptek
    }

    fn default_controls(&self) -> ControlSet {
        let mut frame_sizes = FrameSizes::new();
        frame_sizes
            .add(1, FrameSize { x: 3096, y: 2080 })
            .add(1, FrameSize { x: 1920, y: 1080 })
            .add(2, FrameSize { x: 1548, y: 1040 });

        ControlSet::new()
            .with(Control::Brightness, int32(BRIGHTNESS))
            .with(Control::Contrast, int32(CONTRAST))
            .with(Control::Gamma, int32(GAMMA))
            .with(Control::Hue, int32(HUE))
            .with(Control::Saturation, int32(SATURATION))
            .with(Control::RedBalance, int32(WB_GAIN))
            .with(Control::GreenBalance, int32(WB_GAIN))
            .with(Control::BlueBalance, int32(WB_GAIN))
            // exposure in microseconds
            .with(Control::ExposureAbsolute, int32((100, 60_000_000, 10_000)))
            .with(Control::Gain, int32((100, 5000, 100)))
            .with(Control::Speed, int32((0, 2, 0)))
            .with(Control::HFlip, ControlLimits::boolean(false))
            .with(Control::VFlip, ControlLimits::boolean(false))
            .with(Control::AutoExposure, ControlLimits::boolean(false))
            .with(
                Control::LedState,
                ControlLimits {
                    kind: ControlType::Discrete,
                    min: i64::from(LED_ON),
                    max: i64::from(LED_OFF),
                    step: 1,
                    default: i64::from(LED_ON),
                },
            )
            .with(
                Control::Binning,
                ControlLimits {
                    kind: ControlType::Discrete,
                    min: 1,
                    max: 2,
                    step: 1,
                    default: 1,
                },
            )
            .with_frame_sizes(frame_sizes)
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
            | Control::Gamma
            | Control::Hue
            | Control::Saturation
            | Control::RedBalance
            | Control::GreenBalance
            | Control::BlueBalance
            | Control::ExposureAbsolute
            | Control::Gain
            | Control::LedState => check_range(control, raw, limits),

            // speed counts up from zero whatever the model reports as minimum
            Control::Speed => check_range(control, raw, &ControlLimits { min: 0, ..*limits }),

            // type check already restricted these to on/off
            Control::HFlip | Control::VFlip | Control::AutoExposure => Ok(()),

            Control::Binning => {
                check_binning(control, i32::try_from(raw).unwrap_or(-1), set.frame_sizes())
            }

            _ => Err(unrecognised("Touptek", control)),
        }
    }

    fn menu_string(&self, control: Control, index: i32) -> &'static str {
        if control != Control::LedState {
            warn!("Touptek: no menu for control {}", control);
            return "";
        }

        match index {
            LED_ON => "On",
            LED_FLASH => "Flash",
            LED_OFF => "Off",
            _ => "Invalid index",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(control: Control, value: ControlValue) -> Result<(), ControlError> {
        let backend = TouptekBackend;
        backend.validate(&backend.default_controls(), control, &value)
    }

    #[test]
    fn test_brightness_bounds() {
        assert!(validate(Control::Brightness, ControlValue::Int32(-65))
            .unwrap_err()
            .is_out_of_range());
        assert!(validate(Control::Brightness, ControlValue::Int32(-64)).is_ok());
        assert!(validate(Control::Brightness, ControlValue::Int32(64)).is_ok());
        assert!(validate(Control::Brightness, ControlValue::Int32(65)).is_err());
    }

    #[test]
    fn test_brightness_wrong_type() {
        assert!(matches!(
            validate(Control::Brightness, ControlValue::Boolean(true)),
            Err(ControlError::InvalidControlType { .. })
        ));
    }

    #[test]
    fn test_gamma_uses_inclusive_range() {
        assert!(validate(Control::Gamma, ControlValue::Int32(20)).is_ok());
        assert!(validate(Control::Gamma, ControlValue::Int32(100)).is_ok());
        assert!(validate(Control::Gamma, ControlValue::Int32(180)).is_ok());
        assert!(validate(Control::Gamma, ControlValue::Int32(19)).is_err());
        assert!(validate(Control::Gamma, ControlValue::Int32(181)).is_err());
    }

    #[test]
    fn test_white_balance_channels_share_range() {
        for control in [Control::RedBalance, Control::GreenBalance, Control::BlueBalance] {
            assert!(validate(control, ControlValue::Int32(127)).is_ok());
            assert!(validate(control, ControlValue::Int32(-128)).is_err());
        }
    }

    #[test]
    fn test_speed_lower_bound_is_zero() {
        assert!(validate(Control::Speed, ControlValue::Int32(0)).is_ok());
        assert!(validate(Control::Speed, ControlValue::Int32(-1)).is_err());
        assert!(validate(Control::Speed, ControlValue::Int32(3)).is_err());
    }

    #[test]
    fn test_flip_and_auto_exposure_accept_booleans() {
        assert!(validate(Control::HFlip, ControlValue::Boolean(true)).is_ok());
        assert!(validate(Control::VFlip, ControlValue::Boolean(false)).is_ok());
        assert!(validate(Control::AutoExposure, ControlValue::Boolean(true)).is_ok());
        assert!(validate(Control::AutoExposure, ControlValue::Int32(1)).is_err());
    }

    #[test]
    fn test_binning_requires_frame_sizes() {
        assert!(validate(Control::Binning, ControlValue::Discrete(1)).is_ok());
        assert!(validate(Control::Binning, ControlValue::Discrete(2)).is_ok());
        assert!(validate(Control::Binning, ControlValue::Discrete(3)).is_err());
        assert!(validate(Control::Binning, ControlValue::Discrete(-1)).is_err());
        assert!(validate(Control::Binning, ControlValue::Discrete(5)).is_err());
    }

    #[test]
    fn test_unsupported_control() {
        assert_eq!(
            validate(Control::Sharpness, ControlValue::Int32(1)),
            Err(ControlError::invalid_control(Control::Sharpness))
        );
    }

    #[test]
    fn test_declared_but_unrecognised_control() {
        let backend = TouptekBackend;
        let set = backend
            .default_controls()
            .with(Control::Sharpness, ControlLimits::boolean(false));
        assert_eq!(
            backend.validate(&set, Control::Sharpness, &ControlValue::Boolean(true)),
            Err(ControlError::invalid_control(Control::Sharpness))
        );
    }

    #[test]
    fn test_led_menu_strings() {
        let backend = TouptekBackend;
        assert_eq!(backend.menu_string(Control::LedState, 1), "On");
        assert_eq!(backend.menu_string(Control::LedState, 2), "Flash");
        assert_eq!(backend.menu_string(Control::LedState, 3), "Off");
        assert_eq!(backend.menu_string(Control::LedState, 0), "Invalid index");
        assert_eq!(backend.menu_string(Control::LedState, 4), "Invalid index");
        assert_eq!(backend.menu_string(Control::Gain, 1), "");
    }
}
