use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkelcastError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Sensor error: {0}")]
    Sensor(#[from] SensorError),

    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    #[error("Broadcast error: {0}")]
    Broadcast(#[from] BroadcastError),

    #[error("System error: {message}")]
    System { message: String },
}

impl SkelcastError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }
}

/// Errors raised by the sensor feed. A frame-advance failure is fatal to
/// the whole service; there is nothing useful to do without a feed.
#[derive(Error, Debug)]
pub enum SensorError {
    #[error("Sensor frame advance failed: {details}")]
    FrameAdvanceFailed { details: String },

    #[error("Sensor feed ended")]
    FeedEnded,
}

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("Failed to bind to {address}: {source}")]
    BindFailed {
        address: String,
        source: std::io::Error,
    },

    #[error("Stream server startup failed: {details}")]
    StartupFailed { details: String },
}

#[derive(Error, Debug)]
pub enum BroadcastError {
    #[error("Unexpected send failure on connection {connection}: {details}")]
    SendFailed {
        connection: uuid::Uuid,
        details: String,
    },
}

pub type Result<T> = std::result::Result<T, SkelcastError>;
