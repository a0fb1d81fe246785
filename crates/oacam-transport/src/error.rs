//! Transport Error Types

use thiserror::Error;

/// Errors raised by the byte-level transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Read or write on the camera link failed
    #[error("Camera I/O error: {0}")]
    CameraIo(String),

    /// Read limit reached before a NUL terminator arrived
    #[error("No terminator within {0} bytes")]
    Unterminated(usize),

    /// Serial port could not be opened
    #[error("Failed to open {device}: {reason}")]
    Open { device: String, reason: String },
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::CameraIo(err.to_string())
    }
}
