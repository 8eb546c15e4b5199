use crate::events::TrackedEvent;
use crate::sensor::{CalibrationStatus, SensorEvent, UserId};
use crate::tracker::state::{UserEntry, UserState};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Actions the controller wants performed in response to a sensor event:
/// commands back into the sensor, or events bound for connected clients.
#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect {
    StartPoseDetection { user: UserId, pose: String },
    StopPoseDetection { user: UserId },
    RequestCalibration { user: UserId, force: bool },
    StartTracking { user: UserId },
    Emit(TrackedEvent),
}

/// Per-user tracking lifecycle state machine.
///
/// Owns the user-state map exclusively; every transition is driven through
/// `dispatch`, which maps (current state, sensor event) to a next state
/// and a list of side effects for the caller to apply. Pose gating is a
/// capability flag: with `require_pose` the flow is
/// detected → awaiting pose → calibrating → tracked, without it the pose
/// step is skipped and calibration is requested immediately.
pub struct LifecycleController {
    users: HashMap<UserId, UserEntry>,
    require_pose: bool,
    pose_name: String,
    retry_limit: Option<u32>,
}

impl LifecycleController {
    pub fn new(require_pose: bool, pose_name: impl Into<String>, retry_limit: Option<u32>) -> Self {
        Self {
            users: HashMap::new(),
            require_pose,
            pose_name: pose_name.into(),
            retry_limit,
        }
    }

    /// Apply one sensor event, returning the side effects to perform.
    pub fn dispatch(&mut self, event: &SensorEvent) -> Vec<SideEffect> {
        match event {
            SensorEvent::UserDetected { user } => self.on_user_detected(*user),
            SensorEvent::PoseDetected { user, pose } => self.on_pose_detected(*user, pose),
            SensorEvent::CalibrationStarted { user } => {
                info!(user, "Calibration started");
                Vec::new()
            }
            SensorEvent::CalibrationComplete { user, status } => {
                self.on_calibration_complete(*user, *status)
            }
            SensorEvent::UserLost { user } => self.on_user_lost(*user),
        }
    }

    fn on_user_detected(&mut self, user: UserId) -> Vec<SideEffect> {
        self.users.insert(user, UserEntry::new());
        self.begin_lifecycle(user)
    }

    /// Entry path shared by fresh detection and calibration-failure retry.
    fn begin_lifecycle(&mut self, user: UserId) -> Vec<SideEffect> {
        let entry = match self.users.get_mut(&user) {
            Some(entry) => entry,
            None => return Vec::new(),
        };

        if self.require_pose {
            info!(user, pose = %self.pose_name, "User detected, watching for calibration pose");
            entry.state = UserState::AwaitingPose;
            vec![SideEffect::StartPoseDetection {
                user,
                pose: self.pose_name.clone(),
            }]
        } else {
            info!(user, "User detected, requesting calibration");
            entry.state = UserState::Calibrating;
            vec![SideEffect::RequestCalibration { user, force: true }]
        }
    }

    fn on_pose_detected(&mut self, user: UserId, pose: &str) -> Vec<SideEffect> {
        match self.users.get_mut(&user) {
            Some(entry) if entry.state == UserState::AwaitingPose => {
                info!(user, pose, "Pose detected, requesting calibration");
                entry.state = UserState::Calibrating;
                vec![
                    SideEffect::StopPoseDetection { user },
                    SideEffect::RequestCalibration { user, force: true },
                ]
            }
            Some(entry) => {
                debug!(user, state = %entry.state, "Ignoring stale pose detection");
                Vec::new()
            }
            None => {
                debug!(user, "Ignoring pose detection for unknown user");
                Vec::new()
            }
        }
    }

    fn on_calibration_complete(
        &mut self,
        user: UserId,
        status: CalibrationStatus,
    ) -> Vec<SideEffect> {
        match self.users.get_mut(&user) {
            Some(entry) if entry.state == UserState::Calibrating => match status {
                CalibrationStatus::Ok => {
                    info!(user, "User calibrated, starting skeleton tracking");
                    entry.state = UserState::Tracked;
                    entry.calibration_attempts = 0;
                    vec![SideEffect::StartTracking { user }]
                }
                CalibrationStatus::Failed => {
                    entry.calibration_attempts += 1;
                    let attempts = entry.calibration_attempts;
                    if let Some(limit) = self.retry_limit {
                        if attempts >= limit {
                            warn!(
                                user,
                                attempts, "Calibration retry limit reached, giving up on user"
                            );
                            self.users.remove(&user);
                            return Vec::new();
                        }
                    }
                    warn!(user, attempts, "Calibration failed, restarting lifecycle");
                    self.begin_lifecycle(user)
                }
            },
            Some(entry) => {
                debug!(user, state = %entry.state, "Ignoring calibration result outside calibration");
                Vec::new()
            }
            None => {
                debug!(user, "Ignoring calibration result for unknown user");
                Vec::new()
            }
        }
    }

    fn on_user_lost(&mut self, user: UserId) -> Vec<SideEffect> {
        match self.users.remove(&user) {
            Some(entry) => {
                info!(user, state = %entry.state, "User lost");
                vec![SideEffect::Emit(TrackedEvent::UserLost { user })]
            }
            None => {
                debug!(user, "Ignoring loss of unknown user");
                Vec::new()
            }
        }
    }

    /// Current state of `user`, if known.
    pub fn state_of(&self, user: UserId) -> Option<UserState> {
        self.users.get(&user).map(|entry| entry.state)
    }

    /// Snapshot of every user currently in `Tracked` state. The sampler
    /// consults this once per frame so mid-frame loss cannot tear the set
    /// out from under the iteration.
    pub fn tracked_users(&self) -> Vec<UserId> {
        self.users
            .iter()
            .filter(|(_, entry)| entry.state == UserState::Tracked)
            .map(|(&user, _)| user)
            .collect()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}
