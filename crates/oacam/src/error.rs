//! Camera Error Types

use crate::config::ConfigError;
use oacam_controls::ControlError;
use oacam_queue::CommandError;
use oacam_transport::TransportError;
use thiserror::Error;

/// Errors returned by camera operations
#[derive(Debug, Error)]
pub enum CameraError {
    /// Control id, type or value rejected
    #[error(transparent)]
    Control(#[from] ControlError),

    /// Queued command failed or could not be delivered
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Device link could not be opened
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Invalid camera configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The worker answered with a reply of the wrong shape
    #[error("Unexpected reply to {0}")]
    UnexpectedReply(&'static str),
}

impl CameraError {
    /// Whether the error came from control validation
    pub fn is_control_error(&self) -> bool {
        matches!(
            self,
            CameraError::Control(_) | CameraError::Command(CommandError::Control(_))
        )
    }
}
