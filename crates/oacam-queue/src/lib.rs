//! Camera Command Queue
//!
//! Serializes hardware operations onto one dedicated worker thread per
//! camera. Callers submit a command and block (or await) until the worker
//! has executed it and sent back its result.

mod command;
mod error;
mod queue;
mod worker;

pub use command::{CommandKind, ExposureCallback, ExposureOutcome, ExposureRequest, Reply, Roi};
pub use error::CommandError;
pub use queue::{CommandQueue, Completion};
pub use worker::{spawn, CommandHandler, WorkerHandle};
