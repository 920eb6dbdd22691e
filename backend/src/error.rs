use spindare_shared::{ConfigurationError, SpinError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Spin(#[from] SpinError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("invalid value {value:?} for {key}")]
    Config { key: &'static str, value: String },
    #[error("unknown command {0:?} (try `help`)")]
    UnknownCommand(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
}

impl HostError {
    /// Rejected commands are part of normal play and are not fatal.
    pub fn is_recoverable(&self) -> bool {
        match self {
            HostError::Spin(e) => e.is_invalid_transition(),
            HostError::UnknownCommand(_) => true,
            _ => false,
        }
    }
}
