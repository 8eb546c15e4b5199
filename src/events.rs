use crate::sensor::{JointName, UserId};
use serde::{Deserialize, Serialize};

/// Outward-facing messages broadcast to connected clients.
///
/// Each event serializes to a single JSON object; the transport frames
/// them one per WebSocket text message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TrackedEvent {
    /// A joint position sample for a tracked user.
    #[serde(rename = "joint")]
    JointUpdate {
        user: UserId,
        joint: JointName,
        x: f64,
        y: f64,
        z: f64,
    },
    /// The sensor lost sight of a user; no further samples will follow.
    #[serde(rename = "lostUser")]
    UserLost { user: UserId },
}

impl TrackedEvent {
    /// Serialize the event to its wire form.
    pub fn to_wire(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// The user this event refers to.
    pub fn user(&self) -> UserId {
        match self {
            TrackedEvent::JointUpdate { user, .. } => *user,
            TrackedEvent::UserLost { user } => *user,
        }
    }

    /// Event kind as a string, for filtering and logs.
    pub fn event_type(&self) -> &'static str {
        match self {
            TrackedEvent::JointUpdate { .. } => "joint",
            TrackedEvent::UserLost { .. } => "lostUser",
        }
    }
}
