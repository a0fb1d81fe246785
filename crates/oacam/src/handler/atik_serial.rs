//! Atik Serial Command Handler
//!
//! The opcode table and status-byte framing below are a placeholder wire
//! layer, not the vendor's protocol: every request is a one-byte opcode
//! followed by a little-endian payload, and each reply is a single status
//! byte. Only the read primitives (NUL-terminated identity string, byte-wise
//! reads) follow real Atik serial cameras. Swap `opcode` and `request` for
//! the vendor framing when it is implemented.

use crate::backend::EXPOSURE_STEP_US;
use oacam_controls::{Control, ControlError, ControlSet, ControlValue};
use oacam_queue::{CommandError, CommandHandler, Roi};
use oacam_transport::SerialLink;
use std::io::{Read, Write};
use std::time::Duration;
use tracing::{debug, info};

/// Request opcodes of the placeholder framing
pub mod opcode {
    /// Ask for the model string
    pub const IDENTIFY: u8 = 0x01;
    /// Set ROI: u16 width, u16 height
    pub const SET_ROI: u8 = 0x02;
    /// Set binning: u8 mode
    pub const SET_BINNING: u8 = 0x03;
    /// Start exposure: u32 milliseconds
    pub const START_EXPOSURE: u8 = 0x04;
    /// Close the shutter at the end of an exposure
    pub const END_EXPOSURE: u8 = 0x05;
    /// Abort the running exposure
    pub const ABORT_EXPOSURE: u8 = 0x06;
}

/// Status byte for a successful request
const STATUS_OK: u8 = 0x00;

/// Longest identity string accepted, terminator included
const MAX_IDENT_LEN: usize = 64;

/// Drives an Atik camera over a serial link
pub struct AtikSerialHandler<T> {
    link: SerialLink<T>,
    model: String,
    exposure_us: i64,
    binning: i32,
}

impl<T: Read + Write> AtikSerialHandler<T> {
    /// Identify the camera and take initial settings from `controls`
    pub fn open(link: SerialLink<T>, controls: &ControlSet) -> Result<Self, CommandError> {
        let exposure_us = controls
            .get(Control::ExposureAbsolute)
            .map_or(100_000, |l| l.default);
        let binning = controls
            .get(Control::Binning)
            .and_then(|l| i32::try_from(l.default).ok())
            .unwrap_or(1);

        let mut handler = Self {
            link,
            model: String::new(),
            exposure_us,
            binning,
        };

        handler.link.write(&[opcode::IDENTIFY])?;
        handler.model = handler.link.read_string(MAX_IDENT_LEN)?;
        info!(
            "Atik serial camera on {}: {}",
            handler.link.device(),
            handler.model
        );

        Ok(handler)
    }

    /// Model string reported by the camera
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Serial link to the camera
    pub fn link(&self) -> &SerialLink<T> {
        &self.link
    }

    /// Mutable serial link to the camera
    pub fn link_mut(&mut self) -> &mut SerialLink<T> {
        &mut self.link
    }

    fn request(&mut self, command: &'static str, frame: &[u8]) -> Result<(), CommandError> {
        debug!("Atik serial: {}", command);
        self.link.write(frame)?;

        let mut status = [0u8; 1];
        self.link.read_exact(&mut status)?;
        if status[0] != STATUS_OK {
            return Err(CommandError::Rejected {
                command,
                status: status[0],
            });
        }
        Ok(())
    }
}

impl<T: Read + Write + Send + 'static> CommandHandler for AtikSerialHandler<T> {
    fn set_roi(&mut self, roi: Roi) -> Result<(), CommandError> {
        let invalid = || CommandError::InvalidRoi { x: roi.x, y: roi.y };
        let x = u16::try_from(roi.x).map_err(|_| invalid())?;
        let y = u16::try_from(roi.y).map_err(|_| invalid())?;

        let [x0, x1] = x.to_le_bytes();
        let [y0, y1] = y.to_le_bytes();
        self.request("set ROI", &[opcode::SET_ROI, x0, x1, y0, y1])
    }

    fn set_control(&mut self, control: Control, value: ControlValue) -> Result<(), CommandError> {
        match (control, value) {
            (Control::ExposureAbsolute, ControlValue::Int64(us)) => {
                // sent with the next start-exposure request
                self.exposure_us = us;
                Ok(())
            }
            (Control::Binning, ControlValue::Discrete(mode)) => {
                let mode_byte = u8::try_from(mode)
                    .map_err(|_| ControlError::invalid_control(Control::Binning))?;
                self.request("set binning", &[opcode::SET_BINNING, mode_byte])?;
                self.binning = mode;
                Ok(())
            }
            _ => Err(ControlError::invalid_control(control).into()),
        }
    }

    fn read_control(&mut self, control: Control) -> Result<ControlValue, CommandError> {
        match control {
            Control::ExposureAbsolute => Ok(ControlValue::Int64(self.exposure_us)),
            Control::Binning => Ok(ControlValue::Discrete(self.binning)),
            _ => Err(ControlError::invalid_control(control).into()),
        }
    }

    fn exposure_duration(&self) -> Duration {
        Duration::from_micros(u64::try_from(self.exposure_us).unwrap_or(0))
    }

    fn begin_exposure(&mut self) -> Result<(), CommandError> {
        let ms = u32::try_from(self.exposure_us / EXPOSURE_STEP_US).unwrap_or(u32::MAX);
        let [b0, b1, b2, b3] = ms.to_le_bytes();
        self.request("start exposure", &[opcode::START_EXPOSURE, b0, b1, b2, b3])
    }

    fn end_exposure(&mut self) -> Result<(), CommandError> {
        self.request("end exposure", &[opcode::END_EXPOSURE])
    }

    fn abort_exposure(&mut self) -> Result<(), CommandError> {
        self.request("abort exposure", &[opcode::ABORT_EXPOSURE])
    }

    fn close(&mut self) {
        info!("Closing Atik serial camera on {}", self.link.device());
    }
}
