//! Command Error Types

use oacam_controls::ControlError;
use oacam_transport::TransportError;
use thiserror::Error;

/// Errors produced while executing a queued command
#[derive(Debug, Error)]
pub enum CommandError {
    /// Transport failure inside the worker
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Control rejected by the device side
    #[error(transparent)]
    Control(#[from] ControlError),

    /// An exposure is already scheduled or running
    #[error("Exposure already in progress")]
    ExposureInProgress,

    /// Camera answered with a failure status
    #[error("Camera rejected {command}: status {status:#04x}")]
    Rejected { command: &'static str, status: u8 },

    /// Region of interest the camera cannot represent
    #[error("ROI {x}x{y} is not supported")]
    InvalidRoi { x: u32, y: u32 },

    /// The worker is gone; the command was not executed
    #[error("Camera worker has stopped")]
    WorkerStopped,

    /// The worker thread could not be started
    #[error("Failed to start camera worker: {0}")]
    Spawn(String),
}
