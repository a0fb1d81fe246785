//! Device-Side Command Handlers

mod atik_serial;
mod simulated;

pub use atik_serial::{opcode, AtikSerialHandler};
pub use simulated::SimulatedHandler;
