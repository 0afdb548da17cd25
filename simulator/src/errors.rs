use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to connect to MQTT broker: {0}")]
    Connection(String),

    #[error("MQTT publish error: {0}")]
    Publish(#[from] rumqttc::ClientError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
