//! Domain error types.

use crate::domain::universe::UniverseError;

/// Top-level error type for dipbuyer.
#[derive(Debug, thiserror::Error)]
pub enum TraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Universe(#[from] UniverseError),

    #[error("universe file error in {file}: {reason}")]
    UniverseFile { file: String, reason: String },

    #[error("gateway error: {reason}")]
    Gateway { reason: String },

    #[error("not connected to gateway")]
    NotConnected,

    #[error("no valid order id received from gateway")]
    OrderIdUnavailable,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TraderError {
    pub fn gateway(reason: impl Into<String>) -> Self {
        TraderError::Gateway {
            reason: reason.into(),
        }
    }
}

impl From<&TraderError> for std::process::ExitCode {
    fn from(err: &TraderError) -> Self {
        let code: u8 = match err {
            TraderError::Io(_) => 1,
            TraderError::ConfigParse { .. }
            | TraderError::ConfigMissing { .. }
            | TraderError::ConfigInvalid { .. } => 2,
            TraderError::Universe(_) | TraderError::UniverseFile { .. } => 3,
            TraderError::Gateway { .. }
            | TraderError::NotConnected
            | TraderError::OrderIdUnavailable => 4,
        };
        std::process::ExitCode::from(code)
    }
}
