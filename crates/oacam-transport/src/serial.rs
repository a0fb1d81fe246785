//! Serial Link
//!
//! One-byte-at-a-time reads mirror how serial cameras answer: replies are
//! either a known length or a NUL-terminated string.

use crate::error::TransportError;
use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Read, Write};
use std::time::Duration;
use tracing::{debug, info, trace};

/// Default serial read timeout
const DEFAULT_TIMEOUT_MS: u64 = 2000;

/// Serial port settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Serial device path (e.g., "/dev/ttyUSB0" or "COM3")
    pub device: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Per-read timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: "/dev/ttyUSB0".to_string(),
            baud_rate: 115_200,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Open a serial port as 8N1 with no flow control
pub fn open_serial(
    config: &SerialConfig,
) -> Result<SerialLink<Box<dyn tokio_serial::SerialPort>>, TransportError> {
    info!(
        "Opening serial camera link on {} at {} baud",
        config.device, config.baud_rate
    );

    let port = tokio_serial::new(config.device.as_str(), config.baud_rate)
        .data_bits(tokio_serial::DataBits::Eight)
        .parity(tokio_serial::Parity::None)
        .stop_bits(tokio_serial::StopBits::One)
        .flow_control(tokio_serial::FlowControl::None)
        .timeout(Duration::from_millis(config.timeout_ms))
        .open()
        .map_err(|e| TransportError::Open {
            device: config.device.clone(),
            reason: e.to_string(),
        })?;

    Ok(SerialLink::new(config.device.as_str(), port))
}

/// Blocking byte link to a camera
pub struct SerialLink<T> {
    /// Device name, for diagnostics
    device: String,
    /// Underlying byte stream
    port: T,
}

impl<T: Read + Write> SerialLink<T> {
    /// Wrap an already-open byte stream
    pub fn new(device: &str, port: T) -> Self {
        Self {
            device: device.to_string(),
            port,
        }
    }

    /// Device name this link was opened on
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Borrow the underlying stream
    pub fn get_ref(&self) -> &T {
        &self.port
    }

    /// Mutably borrow the underlying stream
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.port
    }

    /// Write the whole buffer in a single call
    ///
    /// A short write is a failure; nothing is retried.
    pub fn write(&mut self, buf: &[u8]) -> Result<(), TransportError> {
        trace!("{}: write {:02X?}", self.device, buf);
        let written = self.port.write(buf)?;
        if written != buf.len() {
            debug!(
                "{}: short write, {} of {} bytes",
                self.device,
                written,
                buf.len()
            );
            return Err(TransportError::CameraIo(format!(
                "short write: {} of {} bytes",
                written,
                buf.len()
            )));
        }
        self.port.flush()?;
        Ok(())
    }

    /// Read up to `buf.len()` bytes one at a time
    ///
    /// If a read fails after at least one byte arrived, the bytes read so
    /// far are returned as a successful short read.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let mut len = 0;
        while len < buf.len() {
            match self.read_byte() {
                Ok(byte) => {
                    buf[len] = byte;
                    len += 1;
                }
                Err(e) if len == 0 => return Err(e),
                Err(e) => {
                    debug!("{}: short read of {} bytes: {}", self.device, len, e);
                    return Ok(len);
                }
            }
        }
        Ok(len)
    }

    /// Read bytes until a NUL (kept in `buf`) or until `buf` is full
    ///
    /// Returns the number of bytes read including the terminator.
    pub fn read_until_zero(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let mut len = 0;
        while len < buf.len() {
            let byte = self.read_byte()?;
            buf[len] = byte;
            len += 1;
            if byte == 0 {
                return Ok(len);
            }
        }
        Err(TransportError::Unterminated(len))
    }

    /// Read a NUL-terminated string of at most `max` bytes
    pub fn read_string(&mut self, max: usize) -> Result<String, TransportError> {
        let mut buf = vec![0u8; max];
        let len = self.read_until_zero(&mut buf)?;
        buf.truncate(len.saturating_sub(1));
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn read_byte(&mut self) -> Result<u8, TransportError> {
        let mut byte = [0u8; 1];
        loop {
            match self.port.read(&mut byte) {
                Ok(1) => return Ok(byte[0]),
                Ok(_) => {
                    return Err(TransportError::CameraIo(format!(
                        "{}: end of stream",
                        self.device
                    )))
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}
