//! Simulated Camera Handler
//!
//! Stands in for SDK and USB transports: control writes are stored and read
//! back, and exposures take as long as the current exposure setting says.

use crate::backend::CameraFamily;
use oacam_controls::{Control, ControlError, ControlSet, ControlValue};
use oacam_queue::{CommandError, CommandHandler, Roi};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// In-memory camera
pub struct SimulatedHandler {
    family: CameraFamily,
    values: HashMap<Control, ControlValue>,
    roi: Option<Roi>,
    exposing: bool,
}

impl SimulatedHandler {
    /// Create a camera whose controls start at their defaults
    pub fn new(family: CameraFamily, controls: &ControlSet) -> Self {
        let values = controls
            .controls()
            .filter_map(|control| {
                let limits = controls.get(control)?;
                ControlValue::from_i64(limits.kind, limits.default).map(|v| (control, v))
            })
            .collect();

        Self {
            family,
            values,
            roi: None,
            exposing: false,
        }
    }

    /// Last region of interest set
    pub fn roi(&self) -> Option<Roi> {
        self.roi
    }

    /// Length of one exposure-setting unit for this family
    fn exposure_unit(&self) -> Duration {
        match self.family {
            CameraFamily::Uvc => Duration::from_micros(100),
            CameraFamily::AtikSerial | CameraFamily::Touptek => Duration::from_micros(1),
        }
    }
}

impl CommandHandler for SimulatedHandler {
    fn set_roi(&mut self, roi: Roi) -> Result<(), CommandError> {
        debug!("{} simulator: ROI {}x{}", self.family, roi.x, roi.y);
        self.roi = Some(roi);
        Ok(())
    }

    fn set_control(&mut self, control: Control, value: ControlValue) -> Result<(), CommandError> {
        debug!("{} simulator: {} = {:?}", self.family, control, value);
        self.values.insert(control, value);
        Ok(())
    }

    fn read_control(&mut self, control: Control) -> Result<ControlValue, CommandError> {
        self.values
            .get(&control)
            .copied()
            .ok_or_else(|| ControlError::invalid_control(control).into())
    }

    fn exposure_duration(&self) -> Duration {
        let units = self
            .values
            .get(&Control::ExposureAbsolute)
            .map_or(0, |v| v.as_i64());
        self.exposure_unit() * u32::try_from(units).unwrap_or(0)
    }

    fn begin_exposure(&mut self) -> Result<(), CommandError> {
        debug!(
            "{} simulator: exposure started ({:?})",
            self.family,
            self.exposure_duration()
        );
        self.exposing = true;
        Ok(())
    }

    fn end_exposure(&mut self) -> Result<(), CommandError> {
        debug!("{} simulator: exposure finished", self.family);
        self.exposing = false;
        Ok(())
    }

    fn abort_exposure(&mut self) -> Result<(), CommandError> {
        debug!("{} simulator: exposure aborted", self.family);
        self.exposing = false;
        Ok(())
    }

    fn close(&mut self) {
        if self.exposing {
            debug!("{} simulator: closed mid-exposure", self.family);
        }
    }
}
