use crate::error::SensorError;
use crate::sensor::{JointName, JointPosition, SensorEvent, SkeletonSensor, UserId};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};

/// Scripted sensor for testing without real hardware.
///
/// Frames are queued up front with `push_frame`; each `advance_frame` call
/// pops one and returns its events. Joint data and tracking flags are set
/// directly, and every command the service issues is recorded so tests can
/// assert on the exact calls made.
#[derive(Default)]
pub struct MockSensor {
    frames: VecDeque<Vec<SensorEvent>>,
    tracking: HashSet<UserId>,
    active_joints: HashSet<JointName>,
    positions: HashMap<(UserId, JointName), JointPosition>,
    pub calibration_requests: Vec<(UserId, bool)>,
    pub tracking_started: Vec<UserId>,
    pub pose_detection_started: Vec<(String, UserId)>,
    pub pose_detection_stopped: Vec<UserId>,
}

impl MockSensor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a frame whose advance raises the given events.
    pub fn push_frame(&mut self, events: Vec<SensorEvent>) {
        self.frames.push_back(events);
    }

    /// Mark `user` as tracked by the sensor, as `start_tracking` would.
    pub fn set_tracking(&mut self, user: UserId, tracking: bool) {
        if tracking {
            self.tracking.insert(user);
        } else {
            self.tracking.remove(&user);
        }
    }

    pub fn set_joint_active(&mut self, joint: JointName, active: bool) {
        if active {
            self.active_joints.insert(joint);
        } else {
            self.active_joints.remove(&joint);
        }
    }

    pub fn set_joint_position(&mut self, user: UserId, joint: JointName, position: JointPosition) {
        self.positions.insert((user, joint), position);
    }

    pub fn clear_user(&mut self, user: UserId) {
        self.tracking.remove(&user);
        self.positions.retain(|(id, _), _| *id != user);
    }
}

#[async_trait]
impl SkeletonSensor for MockSensor {
    async fn advance_frame(&mut self) -> Result<Vec<SensorEvent>, SensorError> {
        self.frames.pop_front().ok_or(SensorError::FeedEnded)
    }

    fn request_calibration(&mut self, user: UserId, force: bool) {
        self.calibration_requests.push((user, force));
    }

    fn start_tracking(&mut self, user: UserId) {
        self.tracking_started.push(user);
        self.tracking.insert(user);
    }

    fn is_tracking(&self, user: UserId) -> bool {
        self.tracking.contains(&user)
    }

    fn start_pose_detection(&mut self, pose: &str, user: UserId) {
        self.pose_detection_started.push((pose.to_string(), user));
    }

    fn stop_pose_detection(&mut self, user: UserId) {
        self.pose_detection_stopped.push(user);
    }

    fn tracked_users(&self) -> Vec<UserId> {
        self.tracking.iter().copied().collect()
    }

    fn is_joint_active(&self, joint: JointName) -> bool {
        self.active_joints.contains(&joint)
    }

    fn joint_position(&self, user: UserId, joint: JointName) -> Option<JointPosition> {
        self.positions.get(&(user, joint)).copied()
    }
}
