/// Lifecycle position of one detected user.
///
/// There is exactly one state per live user id; loss of a user removes the
/// entry entirely rather than parking it in a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserState {
    /// Freshly detected, no calibration activity yet.
    Detected,
    /// Waiting for the user to hold the calibration pose.
    AwaitingPose,
    /// Calibration requested, waiting on the sensor's verdict.
    Calibrating,
    /// Calibrated and streaming joint data.
    Tracked,
}

impl std::fmt::Display for UserState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            UserState::Detected => "detected",
            UserState::AwaitingPose => "awaiting_pose",
            UserState::Calibrating => "calibrating",
            UserState::Tracked => "tracked",
        };
        f.write_str(name)
    }
}

/// Per-user bookkeeping owned by the controller.
#[derive(Debug)]
pub(crate) struct UserEntry {
    pub state: UserState,
    pub calibration_attempts: u32,
}

impl UserEntry {
    pub fn new() -> Self {
        Self {
            state: UserState::Detected,
            calibration_attempts: 0,
        }
    }
}
