//! Open Astro Camera Control
//!
//! Multi-vendor camera control layer:
//! - Per-family control validation and menu labels (Atik serial, Touptek, UVC)
//! - One I/O worker thread per camera fed by a command queue
//! - Atik serial protocol handler and an in-memory simulator
//!
//! # Example
//!
//! ```no_run
//! use oacam::{Camera, CameraConfig, Control, ControlValue};
//!
//! let camera = Camera::open_simulated(&CameraConfig::touptek())?;
//! camera.set_control(Control::Gamma, ControlValue::Int32(120))?;
//! camera.close();
//! # Ok::<(), oacam::CameraError>(())
//! ```

pub mod backend;
mod camera;
mod config;
mod error;
pub mod handler;

pub use backend::{CameraFamily, ControlBackend};
pub use camera::Camera;
pub use config::{CameraConfig, ConfigError, LimitOverride};
pub use error::CameraError;

pub use oacam_controls::{
    exposure_mode, Control, ControlError, ControlLimits, ControlSet, ControlType, ControlValue,
    FrameSize, FrameSizes,
};
pub use oacam_queue::{CommandError, ExposureOutcome};
pub use oacam_transport::{SerialConfig, TransportError};

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Initialize logging
///
/// Fails if a global subscriber has already been installed.
pub fn init_logging(level: Level) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
}
