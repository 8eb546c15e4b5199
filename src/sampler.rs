use crate::events::TrackedEvent;
use crate::sensor::{JointName, SkeletonSensor, UserId};
use tracing::trace;

/// Per-frame joint extraction for tracked users.
///
/// Runs once per sensor frame over a frame-local snapshot of tracked ids.
/// Each active joint of each tracked user yields one `JointUpdate` event;
/// nothing is batched. A user lost mid-frame simply stops yielding samples
/// (`is_tracking` is re-checked per user and a missing position is skipped),
/// so a stale snapshot entry degrades to silence rather than a torn read.
#[derive(Default)]
pub struct FrameSampler {
    frames_sampled: u64,
    samples_emitted: u64,
}

impl FrameSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample every active joint of every tracked user in `tracked`.
    pub fn sample(
        &mut self,
        sensor: &dyn SkeletonSensor,
        tracked: &[UserId],
    ) -> Vec<TrackedEvent> {
        let mut events = Vec::new();

        for &user in tracked {
            if !sensor.is_tracking(user) {
                trace!(user, "Skipping user no longer tracked by the sensor");
                continue;
            }

            for joint in JointName::ALL {
                if !sensor.is_joint_active(joint) {
                    continue;
                }
                if let Some(pos) = sensor.joint_position(user, joint) {
                    events.push(TrackedEvent::JointUpdate {
                        user,
                        joint,
                        x: pos.x,
                        y: pos.y,
                        z: pos.z,
                    });
                }
            }
        }

        self.frames_sampled += 1;
        self.samples_emitted += events.len() as u64;
        events
    }

    pub fn frames_sampled(&self) -> u64 {
        self.frames_sampled
    }

    pub fn samples_emitted(&self) -> u64 {
        self.samples_emitted
    }
}
