use crate::error::SensorError;
use crate::sensor::{CalibrationStatus, JointName, JointPosition, SensorEvent, UserId};
use async_trait::async_trait;

/// Seam between the service and the skeletal-tracking engine.
///
/// `advance_frame` blocks (asynchronously) until the next sensor frame is
/// ready and returns every notification raised while processing it — this
/// replaces the callback registration the underlying libraries expose.
/// Commands are fire-and-forget: they never fail synchronously; problems
/// surface as later events (a failed calibration, a lost user).
#[async_trait]
pub trait SkeletonSensor: Send {
    /// Block until the next frame is ready, returning the events raised
    /// during the advance. This is the sensor-side suspension point.
    async fn advance_frame(&mut self) -> Result<Vec<SensorEvent>, SensorError>;

    /// Ask the sensor to calibrate a skeleton for `user`.
    fn request_calibration(&mut self, user: UserId, force: bool);

    /// Begin streaming skeleton data for a calibrated user.
    fn start_tracking(&mut self, user: UserId);

    /// Whether the sensor is currently tracking a skeleton for `user`.
    fn is_tracking(&self, user: UserId) -> bool;

    /// Watch for `user` holding the named pose.
    fn start_pose_detection(&mut self, pose: &str, user: UserId);

    /// Stop watching for a pose on `user`.
    fn stop_pose_detection(&mut self, user: UserId);

    /// Users the sensor currently reports as tracked.
    fn tracked_users(&self) -> Vec<UserId>;

    /// Whether the sensor is producing data for `joint` this frame.
    fn is_joint_active(&self, joint: JointName) -> bool;

    /// Position of `joint` for `user`, if the sensor has one this frame.
    fn joint_position(&self, user: UserId, joint: JointName) -> Option<JointPosition>;
}

/// Convenience constructor for calibration-complete events, used by sensor
/// implementations and tests.
pub fn calibration_result(user: UserId, ok: bool) -> SensorEvent {
    SensorEvent::CalibrationComplete {
        user,
        status: if ok {
            CalibrationStatus::Ok
        } else {
            CalibrationStatus::Failed
        },
    }
}
