//! Caller Side of the Command Queue

use crate::command::{CommandKind, Reply};
use crate::error::CommandError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

/// A queued command together with the channel its result goes back on
pub(crate) struct Command {
    pub id: u64,
    pub kind: CommandKind,
    pub reply: oneshot::Sender<Result<Reply, CommandError>>,
}

/// Handle for submitting commands to a camera worker
///
/// Clones share the same worker. The worker keeps running until every
/// clone has been dropped.
#[derive(Clone)]
pub struct CommandQueue {
    tx: mpsc::UnboundedSender<Command>,
    next_id: Arc<AtomicU64>,
}

impl CommandQueue {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Command>) -> Self {
        Self {
            tx,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Append a command to the queue tail without waiting for it
    pub fn submit(&self, kind: CommandKind) -> Result<Completion, CommandError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (reply, rx) = oneshot::channel();

        debug!("Queueing command #{} ({})", id, kind.name());
        self.tx
            .send(Command { id, kind, reply })
            .map_err(|_| CommandError::WorkerStopped)?;

        Ok(Completion { id, rx })
    }

    /// Submit a command and block the calling thread until it has run
    ///
    /// Must not be called from inside an async runtime; use
    /// `dispatch_async` there.
    pub fn dispatch(&self, kind: CommandKind) -> Result<Reply, CommandError> {
        self.submit(kind)?.wait()
    }

    /// Submit a command and wait for it asynchronously
    pub async fn dispatch_async(&self, kind: CommandKind) -> Result<Reply, CommandError> {
        self.submit(kind)?.wait_async().await
    }

    /// Whether the worker is still receiving commands
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// Pending result of one submitted command
pub struct Completion {
    id: u64,
    rx: oneshot::Receiver<Result<Reply, CommandError>>,
}

impl Completion {
    /// Sequence number assigned at submission
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Block until the worker has executed the command
    pub fn wait(self) -> Result<Reply, CommandError> {
        self.rx
            .blocking_recv()
            .map_err(|_| CommandError::WorkerStopped)?
    }

    /// Wait asynchronously until the worker has executed the command
    pub async fn wait_async(self) -> Result<Reply, CommandError> {
        self.rx.await.map_err(|_| CommandError::WorkerStopped)?
    }
}
