//! Atik Serial Control Rules

use super::{CameraFamily, ControlBackend};
use oacam_controls::validator::{check_binning, check_declared, check_range, unrecognised};
use oacam_controls::{
    Control, ControlError, ControlLimits, ControlSet, ControlType, ControlValue, FrameSize,
    FrameSizes,
};
use tracing::warn;

/// Exposure granularity of the serial protocol, in microseconds
pub(crate) const EXPOSURE_STEP_US: i64 = 1000;

/// Atik cameras driven over a serial link
#[derive(Debug, Clone, Copy, Default)]
pub struct AtikSerialBackend;

impl ControlBackend for AtikSerialBackend {
    fn family(&self) -> CameraFamily {
        CameraFamily::AtikSerial
    }

    fn default_controls(&self) -> ControlSet {
        let mut frame_sizes = FrameSizes::new();
        frame_sizes
            .add(1, FrameSize { x: 659, y: 494 })
            .add(2, FrameSize { x: 329, y: 247 });

        ControlSet::new()
            // exposure in microseconds, whole milliseconds only
            .with(
                Control::ExposureAbsolute,
                ControlLimits {
                    kind: ControlType::Int64,
                    min: EXPOSURE_STEP_US,
                    max: 3_600_000_000,
                    step: EXPOSURE_STEP_US,
                    default: 100_000,
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
            Control::ExposureAbsolute => check_range(control, raw, limits),
            Control::Binning => {
                check_binning(control, i32::try_from(raw).unwrap_or(-1), set.frame_sizes())
            }
            _ => Err(unrecognised("Atik serial", control)),
        }
    }

    fn menu_string(&self, control: Control, _index: i32) -> &'static str {
        warn!("Atik serial: no menu for control {}", control);
        ""
    }
}
