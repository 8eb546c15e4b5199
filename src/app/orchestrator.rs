use crate::broadcast::Broadcaster;
use crate::config::SkelcastConfig;
use crate::error::Result;
use crate::registry::ConnectionRegistry;
use crate::sampler::FrameSampler;
use crate::sensor::SkeletonSensor;
use crate::tracker::{LifecycleController, SideEffect};
use std::sync::Arc;
use tracing::info;

/// Drives the whole pipeline: sensor frames in, broadcast events out.
///
/// One cooperative loop advances the sensor, feeds the raised events
/// through the lifecycle controller, applies the resulting side effects,
/// samples every tracked user's active joints, and fans the samples out.
/// Connection handling runs on its own tasks; the loop yields after each
/// frame so they interleave.
pub struct Orchestrator<S: SkeletonSensor> {
    sensor: S,
    controller: LifecycleController,
    sampler: FrameSampler,
    broadcaster: Broadcaster,
}

impl<S: SkeletonSensor> Orchestrator<S> {
    pub fn new(config: &SkelcastConfig, sensor: S, registry: Arc<ConnectionRegistry>) -> Self {
        let controller = LifecycleController::new(
            config.sensor.require_pose,
            config.sensor.pose_name.clone(),
            config.sensor.calibration_retry_limit,
        );

        Self {
            sensor,
            controller,
            sampler: FrameSampler::new(),
            broadcaster: Broadcaster::new(registry),
        }
    }

    /// One full cycle: advance the frame, dispatch its events, sample and
    /// broadcast. A frame-advance failure is fatal and propagates.
    pub async fn run_frame(&mut self) -> Result<()> {
        let events = self.sensor.advance_frame().await?;

        for event in &events {
            let effects = self.controller.dispatch(event);
            self.apply(effects)?;
        }

        let tracked = self.controller.tracked_users();
        for event in self.sampler.sample(&self.sensor, &tracked) {
            self.broadcaster.broadcast(&event)?;
        }

        Ok(())
    }

    fn apply(&mut self, effects: Vec<SideEffect>) -> Result<()> {
        for effect in effects {
            match effect {
                SideEffect::StartPoseDetection { user, pose } => {
                    self.sensor.start_pose_detection(&pose, user)
                }
                SideEffect::StopPoseDetection { user } => self.sensor.stop_pose_detection(user),
                SideEffect::RequestCalibration { user, force } => {
                    self.sensor.request_calibration(user, force)
                }
                SideEffect::StartTracking { user } => self.sensor.start_tracking(user),
                SideEffect::Emit(event) => {
                    self.broadcaster.broadcast(&event)?;
                }
            }
        }
        Ok(())
    }

    /// Run frames until the sensor fails. Yields after every frame so the
    /// connection tasks get scheduled between samples.
    pub async fn run(&mut self) -> Result<()> {
        info!("Sensor polling loop running");
        loop {
            self.run_frame().await?;
            tokio::task::yield_now().await;
        }
    }

    pub fn controller(&self) -> &LifecycleController {
        &self.controller
    }

    pub fn sampler(&self) -> &FrameSampler {
        &self.sampler
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }
}
