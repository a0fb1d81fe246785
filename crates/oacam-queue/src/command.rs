//! Command Definitions

use crate::error::CommandError;
use oacam_controls::{Control, ControlValue};
use std::fmt;
use std::time::SystemTime;

/// Region of interest size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Roi {
    pub x: u32,
    pub y: u32,
}

/// How an exposure ended
#[derive(Debug)]
pub enum ExposureOutcome {
    /// Exposure ran to completion
    Completed,
    /// Exposure was aborted before completion
    Aborted,
    /// The camera failed while starting or finishing the exposure
    Failed(CommandError),
}

/// Called once on the worker thread when an exposure ends
pub type ExposureCallback = Box<dyn FnOnce(ExposureOutcome) + Send + 'static>;

/// Parameters of a start-exposure command
pub struct ExposureRequest {
    /// Wall-clock start time; `None` or a past time starts immediately
    pub when: Option<SystemTime>,
    /// Completion callback
    pub callback: ExposureCallback,
}

impl ExposureRequest {
    /// Create a request
    pub fn new<F>(when: Option<SystemTime>, callback: F) -> Self
    where
        F: FnOnce(ExposureOutcome) + Send + 'static,
    {
        Self {
            when,
            callback: Box::new(callback),
        }
    }
}

impl fmt::Debug for ExposureRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExposureRequest")
            .field("when", &self.when)
            .finish_non_exhaustive()
    }
}

/// A unit of camera work executed by the worker
#[derive(Debug)]
pub enum CommandKind {
    /// Change the region of interest
    SetRoi(Roi),
    /// Schedule or begin an exposure
    StartExposure(ExposureRequest),
    /// Abort the scheduled or running exposure
    AbortExposure,
    /// Write an already-validated control value to the camera
    SetControl(Control, ControlValue),
    /// Read a control value back from the camera
    ReadControl(Control),
}

impl CommandKind {
    /// Short name for diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::SetRoi(_) => "set ROI",
            CommandKind::StartExposure(_) => "start exposure",
            CommandKind::AbortExposure => "abort exposure",
            CommandKind::SetControl(..) => "set control",
            CommandKind::ReadControl(_) => "read control",
        }
    }
}

/// Successful result of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Command executed, nothing to return
    Done,
    /// Control value read from the camera
    Value(ControlValue),
}
