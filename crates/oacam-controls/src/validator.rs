//! Range Checks Shared by Vendor Backends
//!
//! Each backend decides which checks apply to which control; these helpers
//! only answer the individual questions.

use crate::control::{Control, ControlValue};
use crate::error::ControlError;
use crate::limits::{ControlLimits, ControlSet, FrameSizes};
use crate::MAX_BINNING;
use tracing::warn;

/// Check that the camera supports `control` and that `value` carries its declared type
pub fn check_declared<'a>(
    set: &'a ControlSet,
    control: Control,
    value: &ControlValue,
) -> Result<&'a ControlLimits, ControlError> {
    let limits = set
        .get(control)
        .ok_or_else(|| ControlError::invalid_control(control))?;

    if limits.kind != value.kind() {
        return Err(ControlError::InvalidControlType {
            control,
            expected: limits.kind,
            actual: value.kind(),
        });
    }

    Ok(limits)
}

/// Check `value` against `[min, max]` and step alignment
pub fn check_range(
    control: Control,
    value: i64,
    limits: &ControlLimits,
) -> Result<(), ControlError> {
    if limits.accepts(value) {
        Ok(())
    } else {
        Err(out_of_range(control, value, limits))
    }
}

/// Check an unsigned 32-bit control carried in a signed 64-bit value
///
/// Values outside `0..=u32::MAX` are rejected outright; nothing is masked,
/// so the value checked is the value later sent.
pub fn check_unsigned(
    control: Control,
    value: i64,
    limits: &ControlLimits,
) -> Result<(), ControlError> {
    let narrowed = u32::try_from(value).map_err(|_| out_of_range(control, value, limits))?;
    check_range(control, i64::from(narrowed), limits)
}

/// Check a binning mode index against the frame-size table
pub fn check_binning(
    control: Control,
    index: i32,
    frame_sizes: &FrameSizes,
) -> Result<(), ControlError> {
    let supported = usize::try_from(index)
        .ok()
        .filter(|&mode| mode <= MAX_BINNING && frame_sizes.count(mode) > 0);

    match supported {
        Some(_) => Ok(()),
        None => Err(ControlError::OutOfRange {
            control,
            value: i64::from(index),
            min: 0,
            max: MAX_BINNING as i64,
            step: 1,
        }),
    }
}

/// Report a control the backend has no rule for
pub fn unrecognised(backend: &str, control: Control) -> ControlError {
    warn!("Unrecognised control {} in {} validator", control, backend);
    ControlError::invalid_control(control)
}

fn out_of_range(control: Control, value: i64, limits: &ControlLimits) -> ControlError {
    ControlError::OutOfRange {
        control,
        value,
        min: limits.min,
        max: limits.max,
        step: limits.step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::ControlType;
    use crate::limits::FrameSize;
    use proptest::prelude::*;

    fn brightness_set() -> ControlSet {
        ControlSet::new().with(
            Control::Brightness,
            ControlLimits::new(ControlType::Int64, 0, 255, 5, 0).unwrap(),
        )
    }

    #[test]
    fn test_unsupported_control() {
        let set = brightness_set();
        assert_eq!(
            check_declared(&set, Control::Gain, &ControlValue::Int64(1)),
            Err(ControlError::invalid_control(Control::Gain))
        );
    }

    #[test]
    fn test_type_mismatch() {
        let set = brightness_set();
        let err = check_declared(&set, Control::Brightness, &ControlValue::Boolean(true))
            .unwrap_err();
        assert!(matches!(err, ControlError::InvalidControlType { .. }));
    }

    #[test]
    fn test_unsigned_rejects_negative_before_masking() {
        let limits = ControlLimits::new(ControlType::Int64, 0, u32::MAX as i64, 1, 0).unwrap();
        // -1 masked to 32 bits would be u32::MAX, which is in range
        assert!(check_unsigned(Control::Gain, -1, &limits).unwrap_err().is_out_of_range());
        assert!(check_unsigned(Control::Gain, u32::MAX as i64, &limits).is_ok());
    }

    #[test]
    fn test_unsigned_rejects_values_above_u32() {
        let limits = ControlLimits::new(ControlType::Int64, 0, 255, 1, 0).unwrap();
        // 2^32 + 128 would read as 128 if truncated to 32 bits
        let err = check_unsigned(Control::Brightness, (1i64 << 32) + 128, &limits).unwrap_err();
        assert!(err.is_out_of_range());
        assert!(check_unsigned(Control::Brightness, 128, &limits).is_ok());
    }

    #[test]
    fn test_binning_needs_frame_sizes() {
        let mut sizes = FrameSizes::new();
        sizes.add(1, FrameSize { x: 640, y: 480 });
        assert!(check_binning(Control::Binning, 1, &sizes).is_ok());
        assert!(check_binning(Control::Binning, 2, &sizes).is_err());
        assert!(check_binning(Control::Binning, -1, &sizes).is_err());
        assert!(check_binning(Control::Binning, MAX_BINNING as i32 + 1, &sizes).is_err());
    }

    proptest! {
        #[test]
        fn prop_range_accepts_exactly_aligned_values(
            min in -1000i64..1000,
            span in 0i64..2000,
            step in 1i64..50,
            value in -4000i64..4000,
        ) {
            let max = min + span;
            let limits = ControlLimits::new(ControlType::Int32, min, max, step, min).unwrap();
            let expected = value >= min && value <= max && (value - min) % step == 0;
            let result = check_range(Control::Contrast, value, &limits);
            prop_assert_eq!(result.is_ok(), expected);
            if let Err(err) = result {
                prop_assert!(err.is_out_of_range());
            }
        }
    }
}
