pub mod config;
pub mod error;
pub mod events;
pub mod sensor;
pub mod tracker;
pub mod sampler;
pub mod registry;
pub mod broadcast;
pub mod streaming;
pub mod app;

pub use app::Orchestrator;
pub use broadcast::{BroadcastStats, Broadcaster};
pub use config::{SensorConfig, SkelcastConfig, StreamConfig};
pub use error::{Result, SkelcastError};
pub use events::TrackedEvent;
pub use registry::{
    ConnectionHandle, ConnectionId, ConnectionRegistry, ConnectionSink, SinkError,
};
pub use sampler::FrameSampler;
pub use sensor::{
    CalibrationStatus, JointName, JointPosition, MockSensor, SensorEvent, SimulatedSensor,
    SkeletonSensor, UserId,
};
pub use streaming::{StreamServer, StreamServerBuilder};
pub use tracker::{LifecycleController, SideEffect, UserState};
