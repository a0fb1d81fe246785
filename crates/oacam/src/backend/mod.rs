//! Vendor Control Backends
//!
//! Each camera family validates controls and names menu entries its own
//! way. The family is picked when the camera is opened.

mod atik;
mod touptek;
mod uvc;

pub(crate) use atik::EXPOSURE_STEP_US;
pub use atik::AtikSerialBackend;
pub use touptek::TouptekBackend;
pub use uvc::UvcBackend;

use oacam_controls::{Control, ControlError, ControlSet, ControlValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported camera families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraFamily {
    /// Atik cameras on a serial link
    AtikSerial,
    /// Touptek SDK cameras
    Touptek,
    /// USB Video Class cameras
    Uvc,
}

impl CameraFamily {
    /// Get the control backend for this family
    pub fn backend(&self) -> Box<dyn ControlBackend> {
        match self {
            CameraFamily::AtikSerial => Box::new(AtikSerialBackend),
            CameraFamily::Touptek => Box::new(TouptekBackend),
            CameraFamily::Uvc => Box::new(UvcBackend),
        }
    }

    /// Short name used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            CameraFamily::AtikSerial => "Atik serial",
            CameraFamily::Touptek => "Touptek",
            CameraFamily::Uvc => "UVC",
        }
    }
}

impl Default for CameraFamily {
    fn default() -> Self {
        CameraFamily::Uvc
    }
}

impl fmt::Display for CameraFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-family control rules
pub trait ControlBackend: Send + Sync {
    /// Family this backend serves
    fn family(&self) -> CameraFamily;

    /// Controls and limits a freshly opened camera of this family reports
    fn default_controls(&self) -> ControlSet;

    /// Decide whether `value` is acceptable for `control`
    ///
    /// Never touches the camera and never changes state.
    fn validate(
        &self,
        set: &ControlSet,
        control: Control,
        value: &ControlValue,
    ) -> Result<(), ControlError>;

    /// Label for a menu entry
    ///
    /// Returns an empty string for controls that have no menu.
    fn menu_string(&self, control: Control, index: i32) -> &'static str;
}
