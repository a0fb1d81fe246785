//! Camera Control Model
//!
//! Control identifiers, tagged control values, per-session limits and the
//! range checks shared by every vendor backend.

mod control;
mod error;
mod limits;
pub mod validator;

pub use control::{Control, ControlType, ControlValue};
pub use error::ControlError;
pub use limits::{ControlLimits, ControlSet, FrameSize, FrameSizes};

/// Highest binning mode index a camera can report
pub const MAX_BINNING: usize = 4;

/// Auto exposure mode values carried by `Control::AutoExposure`
pub mod exposure_mode {
    /// Fully automatic exposure
    pub const AUTO: i32 = 0;
    /// Manual exposure
    pub const MANUAL: i32 = 1;
    /// Shutter priority
    pub const SHUTTER_PRIORITY: i32 = 2;
    /// Aperture priority
    pub const APERTURE_PRIORITY: i32 = 3;
}
