//! Camera Transport Primitives
//!
//! Blocking byte-level I/O used by serial-attached cameras. The primitives
//! work over any `Read + Write` stream; `open_serial` opens a real port.

mod error;
pub mod mock;
mod serial;

pub use error::TransportError;
pub use serial::{open_serial, SerialConfig, SerialLink};
