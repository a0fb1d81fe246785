//! Camera I/O Worker
//!
//! The worker owns the device transport. It drains the command queue in
//! FIFO order and tracks the single exposure a camera can run at a time.

use crate::command::{CommandKind, ExposureCallback, ExposureOutcome, ExposureRequest, Reply, Roi};
use crate::error::CommandError;
use crate::queue::{Command, CommandQueue};
use oacam_controls::{Control, ControlValue};
use std::thread::JoinHandle;
use std::time::{Duration, Instant, SystemTime};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Device-side operations executed on the worker thread
///
/// Implementations may block; they are only ever called from the worker.
pub trait CommandHandler: Send + 'static {
    /// Change the region of interest
    fn set_roi(&mut self, roi: Roi) -> Result<(), CommandError>;

    /// Write a validated control value
    fn set_control(&mut self, control: Control, value: ControlValue) -> Result<(), CommandError>;

    /// Read a control value back
    fn read_control(&mut self, control: Control) -> Result<ControlValue, CommandError>;

    /// How long an exposure begun now will take
    fn exposure_duration(&self) -> Duration;

    /// Open the shutter / start integrating
    fn begin_exposure(&mut self) -> Result<(), CommandError>;

    /// Finish an exposure whose duration has elapsed
    fn end_exposure(&mut self) -> Result<(), CommandError>;

    /// Stop a running exposure early
    fn abort_exposure(&mut self) -> Result<(), CommandError>;

    /// Release the device; called once when the worker stops
    fn close(&mut self) {}
}

/// Exposure lifecycle as seen by the worker
enum ExposureState {
    Idle,
    Scheduled {
        at: Instant,
        callback: ExposureCallback,
    },
    Exposing {
        until: Instant,
        callback: ExposureCallback,
    },
}

impl ExposureState {
    fn deadline(&self) -> Option<Instant> {
        match self {
            ExposureState::Idle => None,
            ExposureState::Scheduled { at, .. } => Some(*at),
            ExposureState::Exposing { until, .. } => Some(*until),
        }
    }

    fn is_idle(&self) -> bool {
        matches!(self, ExposureState::Idle)
    }
}

/// Join handle for a worker thread
pub struct WorkerHandle {
    name: String,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Worker thread name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wait for the worker to exit
    ///
    /// The worker exits once every `CommandQueue` clone has been dropped
    /// and the remaining commands have run.
    pub fn join(mut self) {
        self.join_thread();
    }

    fn join_thread(&mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("Camera worker {} panicked", self.name);
            }
        }
    }
}

/// Start a dedicated worker thread around `handler`
pub fn spawn<H: CommandHandler>(
    name: &str,
    handler: H,
) -> Result<(CommandQueue, WorkerHandle), CommandError> {
    let (tx, rx) = mpsc::unbounded_channel();
    let worker = Worker::new(handler, rx);

    let thread = std::thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            match tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
            {
                Ok(runtime) => runtime.block_on(worker.run()),
                Err(e) => error!("Camera worker runtime failed to start: {}", e),
            }
        })
        .map_err(|e| CommandError::Spawn(e.to_string()))?;

    info!("Camera worker {} started", name);

    Ok((
        CommandQueue::new(tx),
        WorkerHandle {
            name: name.to_string(),
            thread: Some(thread),
        },
    ))
}

struct Worker<H> {
    handler: H,
    rx: mpsc::UnboundedReceiver<Command>,
    exposure: ExposureState,
}

impl<H: CommandHandler> Worker<H> {
    fn new(handler: H, rx: mpsc::UnboundedReceiver<Command>) -> Self {
        Self {
            handler,
            rx,
            exposure: ExposureState::Idle,
        }
    }

    async fn run(mut self) {
        loop {
            let next = match self.exposure.deadline() {
                Some(deadline) => {
                    tokio::select! {
                        biased;
                        command = self.rx.recv() => Some(command),
                        _ = tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)) => None,
                    }
                }
                None => Some(self.rx.recv().await),
            };

            match next {
                Some(Some(command)) => self.execute(command),
                Some(None) => break,
                None => self.advance_exposure(),
            }
        }

        self.shutdown();
    }

    fn execute(&mut self, command: Command) {
        let Command { id, kind, reply } = command;
        let name = kind.name();
        debug!("Executing command #{} ({})", id, name);

        let result = match kind {
            CommandKind::SetRoi(roi) => self.handler.set_roi(roi).map(|_| Reply::Done),
            CommandKind::SetControl(control, value) => self
                .handler
                .set_control(control, value)
                .map(|_| Reply::Done),
            CommandKind::ReadControl(control) => {
                self.handler.read_control(control).map(Reply::Value)
            }
            CommandKind::StartExposure(request) => {
                self.start_exposure(request).map(|_| Reply::Done)
            }
            CommandKind::AbortExposure => self.abort_exposure().map(|_| Reply::Done),
        };

        if let Err(e) = &result {
            warn!("Command #{} ({}) failed: {}", id, name, e);
        }
        if reply.send(result).is_err() {
            debug!("Caller of command #{} is no longer waiting", id);
        }
    }

    fn start_exposure(&mut self, request: ExposureRequest) -> Result<(), CommandError> {
        if !self.exposure.is_idle() {
            return Err(CommandError::ExposureInProgress);
        }

        let delay = request
            .when
            .and_then(|when| when.duration_since(SystemTime::now()).ok())
            .filter(|delay| !delay.is_zero());

        match delay {
            Some(delay) => {
                debug!("Exposure scheduled in {:?}", delay);
                self.exposure = ExposureState::Scheduled {
                    at: Instant::now() + delay,
                    callback: request.callback,
                };
            }
            None => {
                self.handler.begin_exposure()?;
                self.exposure = ExposureState::Exposing {
                    until: Instant::now() + self.handler.exposure_duration(),
                    callback: request.callback,
                };
            }
        }
        Ok(())
    }

    fn abort_exposure(&mut self) -> Result<(), CommandError> {
        match std::mem::replace(&mut self.exposure, ExposureState::Idle) {
            ExposureState::Idle => {
                debug!("No exposure to abort");
                Ok(())
            }
            ExposureState::Scheduled { callback, .. } => {
                info!("Aborting scheduled exposure");
                callback(ExposureOutcome::Aborted);
                Ok(())
            }
            ExposureState::Exposing { callback, .. } => {
                info!("Aborting running exposure");
                let result = self.handler.abort_exposure();
                callback(ExposureOutcome::Aborted);
                result
            }
        }
    }

    fn advance_exposure(&mut self) {
        match std::mem::replace(&mut self.exposure, ExposureState::Idle) {
            ExposureState::Idle => {}
            ExposureState::Scheduled { callback, .. } => match self.handler.begin_exposure() {
                Ok(()) => {
                    self.exposure = ExposureState::Exposing {
                        until: Instant::now() + self.handler.exposure_duration(),
                        callback,
                    };
                }
                Err(e) => {
                    warn!("Scheduled exposure failed to start: {}", e);
                    callback(ExposureOutcome::Failed(e));
                }
            },
            ExposureState::Exposing { callback, .. } => match self.handler.end_exposure() {
                Ok(()) => {
                    debug!("Exposure complete");
                    callback(ExposureOutcome::Completed);
                }
                Err(e) => {
                    warn!("Exposure failed to complete: {}", e);
                    callback(ExposureOutcome::Failed(e));
                }
            },
        }
    }

    fn shutdown(&mut self) {
        if !self.exposure.is_idle() {
            if let Err(e) = self.abort_exposure() {
                warn!("Abort during shutdown failed: {}", e);
            }
        }
        self.handler.close();
        info!("Camera worker stopped");
    }
}
