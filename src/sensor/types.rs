use serde::{Deserialize, Serialize};

/// Identifier the sensor assigns to a detected person. Unique among
/// currently-known users only; ids may be reused after a user is lost.
pub type UserId = u32;

/// The fixed set of skeletal landmarks the sensor can report.
///
/// Joints are independently flagged active or inactive by the sensor per
/// frame; inactive joints are never sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointName {
    Head,
    Neck,
    Torso,
    LeftShoulder,
    LeftElbow,
    LeftHand,
    RightShoulder,
    RightElbow,
    RightHand,
    LeftHip,
    LeftKnee,
    LeftFoot,
    RightHip,
    RightKnee,
    RightFoot,
}

impl JointName {
    /// Every joint the sensor can report, in no particular order.
    pub const ALL: [JointName; 15] = [
        JointName::Head,
        JointName::Neck,
        JointName::Torso,
        JointName::LeftShoulder,
        JointName::LeftElbow,
        JointName::LeftHand,
        JointName::RightShoulder,
        JointName::RightElbow,
        JointName::RightHand,
        JointName::LeftHip,
        JointName::LeftKnee,
        JointName::LeftFoot,
        JointName::RightHip,
        JointName::RightKnee,
        JointName::RightFoot,
    ];

    /// Wire name of the joint, matching its serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            JointName::Head => "head",
            JointName::Neck => "neck",
            JointName::Torso => "torso",
            JointName::LeftShoulder => "left_shoulder",
            JointName::LeftElbow => "left_elbow",
            JointName::LeftHand => "left_hand",
            JointName::RightShoulder => "right_shoulder",
            JointName::RightElbow => "right_elbow",
            JointName::RightHand => "right_hand",
            JointName::LeftHip => "left_hip",
            JointName::LeftKnee => "left_knee",
            JointName::LeftFoot => "left_foot",
            JointName::RightHip => "right_hip",
            JointName::RightKnee => "right_knee",
            JointName::RightFoot => "right_foot",
        }
    }
}

impl std::fmt::Display for JointName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A 3D joint position sample in sensor coordinates (millimeters).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl JointPosition {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Outcome of a calibration attempt for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationStatus {
    Ok,
    Failed,
}

/// Notifications raised by the sensor while advancing a frame.
///
/// The sensor library drives these through registered callbacks; we model
/// them as an explicit enum so the lifecycle controller is a plain
/// (state, event) transition function instead of implicit callback flow.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorEvent {
    /// A new person entered the sensor's field of view.
    UserDetected { user: UserId },
    /// A user held the requested calibration pose.
    PoseDetected { user: UserId, pose: String },
    /// Calibration began for a user. Informational only.
    CalibrationStarted { user: UserId },
    /// Calibration finished for a user, successfully or not.
    CalibrationComplete {
        user: UserId,
        status: CalibrationStatus,
    },
    /// The sensor can no longer see a user.
    UserLost { user: UserId },
}
