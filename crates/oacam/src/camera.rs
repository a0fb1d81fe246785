//! Camera Session
//!
//! One open camera: its family's control rules, the control limits reported
//! at open, and the queue feeding its I/O worker. Validation happens on the
//! caller's thread; everything that touches hardware goes through the queue.
//!
//! The plain methods block the calling thread until the worker answers and
//! panic if called from inside a tokio runtime. Async code uses the
//! `*_async` variants, which validate the same way.

use crate::backend::{CameraFamily, ControlBackend};
use crate::config::CameraConfig;
use crate::error::CameraError;
use crate::handler::{AtikSerialHandler, SimulatedHandler};
use oacam_controls::{Control, ControlError, ControlLimits, ControlSet, ControlValue};
use oacam_queue::{
    spawn, CommandError, CommandHandler, CommandKind, CommandQueue, ExposureOutcome,
    ExposureRequest, Reply, Roi, WorkerHandle,
};
use oacam_transport::open_serial;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info};

/// An open camera
pub struct Camera {
    backend: Box<dyn ControlBackend>,
    controls: Arc<ControlSet>,
    queue: Option<CommandQueue>,
    worker: Option<WorkerHandle>,
}

impl Camera {
    /// Open a camera around an already-connected device handler
    pub fn open<H: CommandHandler>(config: &CameraConfig, handler: H) -> Result<Self, CameraError> {
        let backend = config.family.backend();
        let controls = Arc::new(config.control_set(backend.as_ref())?);
        let (queue, worker) = spawn(&config.worker_name, handler)?;

        info!(
            "Opened {} camera with {} controls",
            config.family,
            controls.controls().count()
        );

        Ok(Self {
            backend,
            controls,
            queue: Some(queue),
            worker: Some(worker),
        })
    }

    /// Open a camera backed by the in-memory simulator
    pub fn open_simulated(config: &CameraConfig) -> Result<Self, CameraError> {
        let controls = config.control_set(config.family.backend().as_ref())?;
        let handler = SimulatedHandler::new(config.family, &controls);
        Self::open(config, handler)
    }

    /// Open an Atik camera on the serial device named in `config`
    pub fn open_atik_serial(config: &CameraConfig) -> Result<Self, CameraError> {
        config.expect_family(CameraFamily::AtikSerial)?;
        let link = open_serial(&config.serial)?;
        let controls = config.control_set(config.family.backend().as_ref())?;
        let handler = AtikSerialHandler::open(link, &controls)?;
        Self::open(config, handler)
    }

    /// Camera family
    pub fn family(&self) -> CameraFamily {
        self.backend.family()
    }

    /// Limits reported for `control`, if the camera has it
    pub fn limits(&self, control: Control) -> Option<&ControlLimits> {
        self.controls.get(control)
    }

    /// Shared handle to every control's limits
    pub fn controls(&self) -> Arc<ControlSet> {
        Arc::clone(&self.controls)
    }

    /// Check a control value without touching the camera
    pub fn test_control(&self, control: Control, value: &ControlValue) -> Result<(), ControlError> {
        self.backend.validate(&self.controls, control, value)
    }

    /// Validate and write a control value
    ///
    /// Blocks until the worker has applied it. Panics inside an async
    /// runtime; use `set_control_async` there.
    pub fn set_control(&self, control: Control, value: ControlValue) -> Result<(), CameraError> {
        self.test_control(control, &value)?;
        self.dispatch(CommandKind::SetControl(control, value))?;
        Ok(())
    }

    /// Validate and write a control value without blocking the runtime
    pub async fn set_control_async(
        &self,
        control: Control,
        value: ControlValue,
    ) -> Result<(), CameraError> {
        self.test_control(control, &value)?;
        self.dispatch_async(CommandKind::SetControl(control, value)).await?;
        Ok(())
    }

    /// Read a control value back from the camera
    ///
    /// Blocks; panics inside an async runtime.
    pub fn read_control(&self, control: Control) -> Result<ControlValue, CameraError> {
        self.check_readable(control)?;
        Self::control_value(self.dispatch(CommandKind::ReadControl(control))?)
    }

    /// Read a control value back without blocking the runtime
    pub async fn read_control_async(&self, control: Control) -> Result<ControlValue, CameraError> {
        self.check_readable(control)?;
        Self::control_value(self.dispatch_async(CommandKind::ReadControl(control)).await?)
    }

    /// Change the region of interest
    ///
    /// Blocks; panics inside an async runtime.
    pub fn set_roi(&self, x: u32, y: u32) -> Result<(), CameraError> {
        self.dispatch(CommandKind::SetRoi(Roi { x, y }))?;
        Ok(())
    }

    /// Change the region of interest without blocking the runtime
    pub async fn set_roi_async(&self, x: u32, y: u32) -> Result<(), CameraError> {
        self.dispatch_async(CommandKind::SetRoi(Roi { x, y })).await?;
        Ok(())
    }

    /// Schedule an exposure
    ///
    /// Returns once the exposure is scheduled or started. `callback` runs on
    /// the worker thread when the exposure completes, fails or is aborted.
    /// Blocks; panics inside an async runtime.
    pub fn start_exposure<F>(&self, when: Option<SystemTime>, callback: F) -> Result<(), CameraError>
    where
        F: FnOnce(ExposureOutcome) + Send + 'static,
    {
        self.dispatch(CommandKind::StartExposure(ExposureRequest::new(when, callback)))?;
        Ok(())
    }

    /// Schedule an exposure without blocking the runtime
    pub async fn start_exposure_async<F>(
        &self,
        when: Option<SystemTime>,
        callback: F,
    ) -> Result<(), CameraError>
    where
        F: FnOnce(ExposureOutcome) + Send + 'static,
    {
        self.dispatch_async(CommandKind::StartExposure(ExposureRequest::new(when, callback)))
            .await?;
        Ok(())
    }

    /// Abort the scheduled or running exposure, if any
    ///
    /// Blocks; panics inside an async runtime.
    pub fn abort_exposure(&self) -> Result<(), CameraError> {
        self.dispatch(CommandKind::AbortExposure)?;
        Ok(())
    }

    /// Abort the exposure without blocking the runtime
    pub async fn abort_exposure_async(&self) -> Result<(), CameraError> {
        self.dispatch_async(CommandKind::AbortExposure).await?;
        Ok(())
    }

    /// Label for a menu entry of `control`
    pub fn menu_string(&self, control: Control, index: i32) -> &'static str {
        self.backend.menu_string(control, index)
    }

    /// Finish queued commands, stop the worker and release the device
    pub fn close(mut self) {
        self.shutdown();
    }

    fn check_readable(&self, control: Control) -> Result<(), ControlError> {
        if self.controls.supports(control) {
            Ok(())
        } else {
            Err(ControlError::invalid_control(control))
        }
    }

    fn control_value(reply: Reply) -> Result<ControlValue, CameraError> {
        match reply {
            Reply::Value(value) => Ok(value),
            Reply::Done => Err(CameraError::UnexpectedReply("read control")),
        }
    }

    fn queue(&self) -> Result<&CommandQueue, CommandError> {
        self.queue.as_ref().ok_or(CommandError::WorkerStopped)
    }

    fn dispatch(&self, kind: CommandKind) -> Result<Reply, CameraError> {
        Ok(self.queue()?.dispatch(kind)?)
    }

    async fn dispatch_async(&self, kind: CommandKind) -> Result<Reply, CameraError> {
        Ok(self.queue()?.dispatch_async(kind).await?)
    }

    fn shutdown(&mut self) {
        // the worker exits once its last sender is gone
        self.queue.take();
        if let Some(worker) = self.worker.take() {
            debug!("Waiting for camera worker {}", worker.name());
            worker.join();
            info!("Closed {} camera", self.backend.family());
        }
    }
}

impl Drop for Camera {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use oacam_transport::mock::ScriptedPort;
    use oacam_transport::SerialLink;
    use std::sync::mpsc;
    use std::time::Duration;

    fn uvc_camera() -> Camera {
        Camera::open_simulated(&CameraConfig::uvc()).unwrap()
    }

    #[test]
    fn test_brightness_scenario() {
        let camera = uvc_camera();
        let min = camera.limits(Control::Brightness).unwrap().min;

        let below = camera.set_control(Control::Brightness, ControlValue::Int64(min - 1));
        assert!(matches!(
            below,
            Err(CameraError::Control(ControlError::OutOfRange { .. }))
        ));

        camera
            .set_control(Control::Brightness, ControlValue::Int64(min))
            .unwrap();
        assert_eq!(
            camera.read_control(Control::Brightness).unwrap(),
            ControlValue::Int64(min)
        );

        let wrong_type = camera.set_control(Control::Brightness, ControlValue::Boolean(true));
        assert!(matches!(
            wrong_type,
            Err(CameraError::Control(ControlError::InvalidControlType { .. }))
        ));
    }

    #[test]
    fn test_rejected_value_never_reaches_camera() {
        let camera = Camera::open_simulated(&CameraConfig::touptek()).unwrap();
        assert!(camera
            .set_control(Control::Gamma, ControlValue::Int32(500))
            .is_err());
        assert_eq!(
            camera.read_control(Control::Gamma).unwrap(),
            ControlValue::Int32(100)
        );
    }

    #[test]
    fn test_read_unsupported_control() {
        let camera = Camera::open_simulated(&CameraConfig::touptek()).unwrap();
        let err = camera.read_control(Control::Sharpness).unwrap_err();
        assert!(err.is_control_error());
    }

    #[test]
    fn test_menu_strings_follow_family() {
        let camera = Camera::open_simulated(&CameraConfig::touptek()).unwrap();
        assert_eq!(camera.family(), CameraFamily::Touptek);
        assert_eq!(camera.menu_string(Control::LedState, 2), "Flash");

        let camera = uvc_camera();
        assert_eq!(camera.menu_string(Control::AutoExposure, 8), "Aperture Priority");
    }

    #[test]
    fn test_concurrent_callers_each_complete_once() {
        let camera = uvc_camera();

        std::thread::scope(|s| {
            for i in 0..8u32 {
                let camera = &camera;
                s.spawn(move || {
                    camera.set_roi(100 + i, 100 + i).unwrap();
                    camera
                        .set_control(Control::Gain, ControlValue::Int64(i64::from(i)))
                        .unwrap();
                });
            }
        });

        let gain = camera.read_control(Control::Gain).unwrap().as_i64();
        assert!((0..8).contains(&gain));
    }

    #[test]
    fn test_exposure_completes() {
        let camera = uvc_camera();
        // 100 units of 100us
        camera
            .set_control(Control::ExposureAbsolute, ControlValue::Int64(100))
            .unwrap();

        let (tx, rx) = mpsc::channel();
        camera
            .start_exposure(None, move |outcome| {
                let _ = tx.send(outcome);
            })
            .unwrap();

        let outcome = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(outcome, ExposureOutcome::Completed));
    }

    #[test]
    fn test_start_then_abort() {
        let camera = uvc_camera();
        camera
            .set_control(Control::ExposureAbsolute, ControlValue::Int64(5000))
            .unwrap();

        let (tx, rx) = mpsc::channel();
        camera
            .start_exposure(None, move |outcome| {
                let _ = tx.send(outcome);
            })
            .unwrap();
        assert!(matches!(
            camera.start_exposure(None, |_| {}),
            Err(CameraError::Command(CommandError::ExposureInProgress))
        ));
        camera.abort_exposure().unwrap();

        let outcome = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(outcome, ExposureOutcome::Aborted));
    }

    #[test]
    fn test_abort_without_exposure_is_noop() {
        let camera = uvc_camera();
        camera.abort_exposure().unwrap();
    }

    #[test]
    fn test_close_aborts_scheduled_exposure() {
        let camera = uvc_camera();
        let (tx, rx) = mpsc::channel();
        let later = SystemTime::now() + Duration::from_secs(3600);
        camera
            .start_exposure(Some(later), move |outcome| {
                let _ = tx.send(outcome);
            })
            .unwrap();

        camera.close();
        let outcome = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(outcome, ExposureOutcome::Aborted));
    }

    #[test]
    fn test_atik_serial_over_scripted_port() {
        let mut port = ScriptedPort::new(b"Atik 16IC\0");
        // binning status, ROI status
        port.push_input(&[0x00, 0x00]);
        let link = SerialLink::new("mock", port);

        let config = CameraConfig::atik_serial("mock");
        let controls = config
            .control_set(config.family.backend().as_ref())
            .unwrap();
        let handler = AtikSerialHandler::open(link, &controls).unwrap();
        let camera = Camera::open(&config, handler).unwrap();

        camera
            .set_control(Control::Binning, ControlValue::Discrete(2))
            .unwrap();
        camera.set_roi(329, 247).unwrap();
        assert_eq!(
            camera.read_control(Control::Binning).unwrap(),
            ControlValue::Discrete(2)
        );

        // no more scripted status bytes: the camera does not answer
        let err = camera.set_roi(100, 100).unwrap_err();
        assert!(matches!(err, CameraError::Command(CommandError::Transport(_))));

        assert!(camera
            .set_control(Control::Gain, ControlValue::Int32(1))
            .unwrap_err()
            .is_control_error());
    }

    #[test]
    fn test_limit_override_applies_to_validation() {
        let mut config = CameraConfig::uvc();
        config.limits.push(crate::config::LimitOverride {
            control: Control::Gain,
            min: 10,
            max: 20,
            step: 1,
            default: None,
            kind: None,
        });
        let camera = Camera::open_simulated(&config).unwrap();
        assert!(camera
            .test_control(Control::Gain, &ControlValue::Int64(5))
            .is_err());
        assert!(camera
            .test_control(Control::Gain, &ControlValue::Int64(15))
            .is_ok());
    }

    #[test]
    fn test_oversized_unsigned_value_never_reaches_camera() {
        let camera = uvc_camera();
        let result =
            camera.set_control(Control::Brightness, ControlValue::Int64((1i64 << 32) + 128));
        assert!(matches!(
            result,
            Err(CameraError::Control(ControlError::OutOfRange { .. }))
        ));
        assert_eq!(
            camera.read_control(Control::Brightness).unwrap(),
            ControlValue::Int64(128)
        );
    }

    #[test]
    fn test_atik_serial_requires_atik_config() {
        let result = Camera::open_atik_serial(&CameraConfig::uvc());
        assert!(matches!(
            result,
            Err(CameraError::Config(ConfigError::FamilyMismatch {
                expected: CameraFamily::AtikSerial,
                actual: CameraFamily::Uvc,
            }))
        ));
    }

    #[tokio::test]
    async fn test_async_camera_api() {
        let camera = Camera::open_simulated(&CameraConfig::touptek()).unwrap();

        let rejected = camera
            .set_control_async(Control::Gamma, ControlValue::Int32(500))
            .await;
        assert!(matches!(
            rejected,
            Err(CameraError::Control(ControlError::OutOfRange { .. }))
        ));
        assert_eq!(
            camera.read_control_async(Control::Gamma).await.unwrap(),
            ControlValue::Int32(100)
        );

        camera
            .set_control_async(Control::Gamma, ControlValue::Int32(150))
            .await
            .unwrap();
        assert_eq!(
            camera.read_control_async(Control::Gamma).await.unwrap(),
            ControlValue::Int32(150)
        );
        camera.set_roi_async(1920, 1080).await.unwrap();

        let (tx, rx) = mpsc::channel();
        let later = SystemTime::now() + Duration::from_secs(3600);
        camera
            .start_exposure_async(Some(later), move |outcome| {
                let _ = tx.send(outcome);
            })
            .await
            .unwrap();
        camera.abort_exposure_async().await.unwrap();
        let outcome = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(outcome, ExposureOutcome::Aborted));
    }
}
