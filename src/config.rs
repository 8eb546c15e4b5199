use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SkelcastConfig {
    pub sensor: SensorConfig,
    pub stream: StreamConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SensorConfig {
    /// Require a calibration pose before requesting calibration
    #[serde(default = "default_require_pose")]
    pub require_pose: bool,

    /// Name of the calibration pose the user must hold
    #[serde(default = "default_pose_name")]
    pub pose_name: String,

    /// Give up on a user after this many failed calibrations (unset = retry forever)
    pub calibration_retry_limit: Option<u32>,

    /// Sensor frames per second
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StreamConfig {
    /// IP address to bind to
    #[serde(default = "default_stream_ip")]
    pub ip: String,

    /// Port to listen on
    #[serde(default = "default_stream_port")]
    pub port: u16,
}

impl SkelcastConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("skelcast.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            // Start with default values
            .set_default("sensor.require_pose", default_require_pose())?
            .set_default("sensor.pose_name", default_pose_name())?
            .set_default("sensor.frame_rate", default_frame_rate())?
            .set_default("stream.ip", default_stream_ip())?
            .set_default("stream.port", default_stream_port())?
            // Add configuration file (optional)
            .add_source(File::with_name(&path_str).required(false))
            // Add environment variables with SKELCAST_ prefix
            .add_source(Environment::with_prefix("SKELCAST").separator("_"))
            .build()?;

        let config: SkelcastConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sensor.frame_rate == 0 {
            return Err(ConfigError::Message(
                "Sensor frame_rate must be greater than 0".to_string(),
            ));
        }

        if self.sensor.require_pose && self.sensor.pose_name.is_empty() {
            return Err(ConfigError::Message(
                "Sensor pose_name must not be empty when require_pose is set".to_string(),
            ));
        }

        if let Some(limit) = self.sensor.calibration_retry_limit {
            if limit == 0 {
                return Err(ConfigError::Message(
                    "Calibration retry limit must be greater than 0 when set".to_string(),
                ));
            }
        }

        if self.stream.port == 0 {
            return Err(ConfigError::Message(
                "Stream port must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for SkelcastConfig {
    fn default() -> Self {
        Self {
            sensor: SensorConfig {
                require_pose: default_require_pose(),
                pose_name: default_pose_name(),
                calibration_retry_limit: None,
                frame_rate: default_frame_rate(),
            },
            stream: StreamConfig {
                ip: default_stream_ip(),
                port: default_stream_port(),
            },
        }
    }
}

// Default value functions
fn default_require_pose() -> bool {
    true
}
fn default_pose_name() -> String {
    "Psi".to_string()
}
fn default_frame_rate() -> u32 {
    30
}

fn default_stream_ip() -> String {
    "0.0.0.0".to_string()
}
fn default_stream_port() -> u16 {
    8080
}
