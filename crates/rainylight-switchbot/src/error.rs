//! SwitchBot-specific error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SwitchBotError {
    /// Non-2xx HTTP status.
    #[error("Remote API error ({status}): {body}")]
    RemoteApi { status: u16, body: String },

    /// HTTP 2xx but the envelope reports a failure.
    #[error("API refused request (statusCode {status_code}): {message}")]
    ApiStatus { status_code: i64, message: String },

    #[error("Invalid response: {0}")]
    Parse(String),

    #[error("Invalid request: {0}")]
    Request(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Failure of one command in a sequence.
#[derive(Error, Debug)]
pub enum RemoteCommandError {
    #[error("Command rejected ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Command refused (statusCode {status_code}): {message}")]
    Refused { status_code: i64, message: String },

    #[error("Command not delivered: {0}")]
    Transport(#[from] SwitchBotError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_wraps_client_error() {
        let err: RemoteCommandError = SwitchBotError::Request("Invalid device id".into()).into();
        assert!(matches!(err, RemoteCommandError::Transport(_)));
        assert!(err.to_string().contains("Invalid device id"));
    }

    #[test]
    fn test_display_includes_status_and_body() {
        let err = RemoteCommandError::Rejected {
            status: 500,
            body: "boom".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("boom"));
    }
}
