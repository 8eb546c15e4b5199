use crate::error::SensorError;
use crate::sensor::{CalibrationStatus, JointName, JointPosition, SensorEvent, SkeletonSensor, UserId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

const POSE_HOLD_FRAMES: u64 = 15;
const CALIBRATION_FRAMES: u64 = 30;
const VISIBLE_FRAMES: u64 = 900;
const RESPAWN_GAP_FRAMES: u64 = 60;

/// Synthetic sensor feed so the service can run without tracking hardware.
///
/// One simulated person at a time walks through the full lifecycle:
/// detection, pose hold, calibration, tracking with animated joints, and
/// eventual loss, after which a fresh user id appears. Commands issued by
/// the lifecycle controller drive the scripted responses, so the whole
/// control path is exercised end to end.
pub struct SimulatedSensor {
    frame_interval: Duration,
    frame: u64,
    next_user: UserId,
    next_spawn: u64,
    users: HashMap<UserId, SimUser>,
    pending: Vec<SensorEvent>,
}

struct SimUser {
    appeared_at: u64,
    phase: SimPhase,
}

enum SimPhase {
    Idle,
    PoseWatch { pose: String, due: u64 },
    Calibrating { due: u64 },
    Tracking,
}

impl SimulatedSensor {
    pub fn new(frame_interval: Duration) -> Self {
        Self {
            frame_interval,
            frame: 0,
            next_user: 1,
            next_spawn: 5,
            users: HashMap::new(),
            pending: Vec::new(),
        }
    }

    fn spawn_user(&mut self, events: &mut Vec<SensorEvent>) {
        let user = self.next_user;
        self.next_user += 1;
        self.users.insert(
            user,
            SimUser {
                appeared_at: self.frame,
                phase: SimPhase::Idle,
            },
        );
        debug!(user, "Simulated user entered the scene");
        events.push(SensorEvent::UserDetected { user });
    }

    /// Deterministic joint animation: a gentle orbit around a per-joint
    /// base offset, phase-shifted per user so two users never overlap.
    fn animated_position(&self, user: UserId, joint: JointName) -> JointPosition {
        let joint_index = JointName::ALL
            .iter()
            .position(|j| *j == joint)
            .unwrap_or(0) as f64;
        let t = self.frame as f64 / 30.0 + user as f64;
        JointPosition::new(
            joint_index * 50.0 + 100.0 * t.sin(),
            1500.0 - joint_index * 100.0,
            2000.0 + 100.0 * t.cos(),
        )
    }
}

#[async_trait]
impl SkeletonSensor for SimulatedSensor {
    async fn advance_frame(&mut self) -> Result<Vec<SensorEvent>, SensorError> {
        tokio::time::sleep(self.frame_interval).await;
        self.frame += 1;

        let mut events = std::mem::take(&mut self.pending);

        if self.users.is_empty() && self.frame >= self.next_spawn {
            self.spawn_user(&mut events);
        }

        let frame = self.frame;
        let mut lost = Vec::new();
        for (&user, sim) in self.users.iter_mut() {
            let ripe = match &sim.phase {
                SimPhase::PoseWatch { pose, due } if frame >= *due => {
                    Some(SensorEvent::PoseDetected {
                        user,
                        pose: pose.clone(),
                    })
                }
                SimPhase::Calibrating { due } if frame >= *due => {
                    Some(SensorEvent::CalibrationComplete {
                        user,
                        status: CalibrationStatus::Ok,
                    })
                }
                SimPhase::Tracking if frame - sim.appeared_at >= VISIBLE_FRAMES => {
                    lost.push(user);
                    None
                }
                _ => None,
            };

            if let Some(event) = ripe {
                if matches!(event, SensorEvent::CalibrationComplete { .. }) {
                    sim.phase = SimPhase::Idle;
                }
                events.push(event);
            }
        }

        for user in lost {
            self.users.remove(&user);
            debug!(user, "Simulated user left the scene");
            events.push(SensorEvent::UserLost { user });
            self.next_spawn = frame + RESPAWN_GAP_FRAMES;
        }

        Ok(events)
    }

    fn request_calibration(&mut self, user: UserId, _force: bool) {
        if let Some(sim) = self.users.get_mut(&user) {
            sim.phase = SimPhase::Calibrating {
                due: self.frame + CALIBRATION_FRAMES,
            };
            self.pending
                .push(SensorEvent::CalibrationStarted { user });
        }
    }

    fn start_tracking(&mut self, user: UserId) {
        if let Some(sim) = self.users.get_mut(&user) {
            sim.phase = SimPhase::Tracking;
        }
    }

    fn is_tracking(&self, user: UserId) -> bool {
        matches!(
            self.users.get(&user).map(|s| &s.phase),
            Some(SimPhase::Tracking)
        )
    }

    fn start_pose_detection(&mut self, pose: &str, user: UserId) {
        if let Some(sim) = self.users.get_mut(&user) {
            sim.phase = SimPhase::PoseWatch {
                pose: pose.to_string(),
                due: self.frame + POSE_HOLD_FRAMES,
            };
        }
    }

    fn stop_pose_detection(&mut self, user: UserId) {
        if let Some(sim) = self.users.get_mut(&user) {
            if matches!(sim.phase, SimPhase::PoseWatch { .. }) {
                sim.phase = SimPhase::Idle;
            }
        }
    }

    fn tracked_users(&self) -> Vec<UserId> {
        self.users
            .iter()
            .filter(|(_, s)| matches!(s.phase, SimPhase::Tracking))
            .map(|(&user, _)| user)
            .collect()
    }

    fn is_joint_active(&self, _joint: JointName) -> bool {
        true
    }

    fn joint_position(&self, user: UserId, joint: JointName) -> Option<JointPosition> {
        if self.is_tracking(user) {
            Some(self.animated_position(user, joint))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant_sensor() -> SimulatedSensor {
        SimulatedSensor::new(Duration::from_millis(0))
    }

    #[tokio::test]
    async fn simulated_user_completes_lifecycle() {
        let mut sensor = instant_sensor();

        // Advance until the first user is detected.
        let user = loop {
            let events = sensor.advance_frame().await.unwrap();
            if let Some(SensorEvent::UserDetected { user }) = events.first() {
                break *user;
            }
        };

        sensor.start_pose_detection("Psi", user);
        loop {
            let events = sensor.advance_frame().await.unwrap();
            if events
                .iter()
                .any(|e| matches!(e, SensorEvent::PoseDetected { .. }))
            {
                break;
            }
        }

        sensor.stop_pose_detection(user);
        sensor.request_calibration(user, true);
        loop {
            let events = sensor.advance_frame().await.unwrap();
            if events.iter().any(|e| {
                matches!(
                    e,
                    SensorEvent::CalibrationComplete {
                        status: CalibrationStatus::Ok,
                        ..
                    }
                )
            }) {
                break;
            }
        }

        sensor.start_tracking(user);
        assert!(sensor.is_tracking(user));
        assert_eq!(sensor.tracked_users(), vec![user]);
        assert!(sensor.joint_position(user, JointName::Head).is_some());
    }

    #[tokio::test]
    async fn untracked_user_has_no_joint_data() {
        let sensor = instant_sensor();
        assert!(sensor.joint_position(42, JointName::Head).is_none());
    }
}
