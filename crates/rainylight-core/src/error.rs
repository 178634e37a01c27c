//! Shared error types for rainylight.
//!
//! The integration crates keep their own error enums; this module holds the
//! taxonomy the binaries report against:
//! - configuration problems found before any network call
//! - transport failures classified from `reqwest`
//! - service-level failures carried as strings from the integration crates

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` for a short operator-facing line.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// Device-cloud failures mapped from the SwitchBot crate.
    #[error("Device error: {0}")]
    Device(String),

    /// Forecast failures mapped from the weather crate.
    #[error("Forecast error: {0}")]
    Forecast(String),
}

impl AppError {
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Config(e) => e.user_message(),
            AppError::Network(e) => e.user_message(),
            AppError::Device(_) => "The light could not be updated.",
            AppError::Forecast(_) => "The forecast could not be read.",
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => "Unable to connect. Check the network.",
            NetworkError::Timeout => "The request timed out.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The remote service is having issues."
            }
            NetworkError::ServerError { .. } => "The remote service rejected the request.",
            NetworkError::InvalidResponse(_) => "Received an unexpected response.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    MissingSetting(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::MissingSetting(_) => "A required environment variable is not set.",
            ConfigError::Invalid(_) => "Invalid configuration. Check the environment.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_connect() {
            NetworkError::ConnectionFailed(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_are_non_empty() {
        let errors = vec![
            AppError::Config(ConfigError::MissingSetting("SWITCHBOT_SECRET".into())),
            AppError::Network(NetworkError::Timeout),
            AppError::Device("401".into()),
            AppError::Forecast("500".into()),
        ];

        for err in errors {
            assert!(!err.user_message().is_empty());
            assert!(!err.to_string().is_empty());
        }
    }

    #[test]
    fn test_server_error_message_depends_on_status() {
        let server = NetworkError::ServerError {
            status: 503,
            message: "unavailable".into(),
        };
        let client = NetworkError::ServerError {
            status: 400,
            message: "bad request".into(),
        };
        assert_ne!(server.user_message(), client.user_message());
    }

    #[test]
    fn test_config_error_converts_into_app_error() {
        let err: AppError = ConfigError::Invalid("timeout".into()).into();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("timeout"));
    }
}
