//! Control Validation Error Types

use crate::control::{Control, ControlType};
use thiserror::Error;

/// Errors raised while validating a control value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    /// Control id is not supported by this camera or not recognised by the backend
    #[error("Invalid control id {0}")]
    InvalidControl(u32),

    /// Value tag does not match the control's declared type
    #[error("{control} expects a {expected:?} value, got {actual:?}")]
    InvalidControlType {
        control: Control,
        expected: ControlType,
        actual: ControlType,
    },

    /// Value outside the control's limits or not aligned to its step
    #[error("{control} value {value} is out of range [{min}, {max}] step {step}")]
    OutOfRange {
        control: Control,
        value: i64,
        min: i64,
        max: i64,
        step: i64,
    },

    /// Limits that can never admit a value
    #[error("Invalid limits: min {min}, max {max}, step {step}")]
    InvalidLimits { min: i64, max: i64, step: i64 },
}

impl ControlError {
    /// Build an `InvalidControl` error for a known control
    pub fn invalid_control(control: Control) -> Self {
        ControlError::InvalidControl(control.id())
    }

    /// Whether this is an `OutOfRange` rejection
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, ControlError::OutOfRange { .. })
    }
}
