mod interface;
mod mock;
mod simulated;
mod types;

pub use interface::{calibration_result, SkeletonSensor};
pub use mock::MockSensor;
pub use simulated::SimulatedSensor;
pub use types::{CalibrationStatus, JointName, JointPosition, SensorEvent, UserId};
