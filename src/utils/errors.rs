use thiserror::Error;

/// Main error type for listgen
#[derive(Error, Debug)]
pub enum ListgenError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("API error ({status}): {message}")]
    AuthOrApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Unknown error: {0}")]
    UnknownError(String),
}

impl ListgenError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::AuthOrApiError {
            status,
            message: message.into(),
        }
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::NetworkError(msg.into())
    }

    pub fn unknown(msg: impl Into<String>) -> Self {
        Self::UnknownError(msg.into())
    }
}

impl From<reqwest::Error> for ListgenError {
    fn from(err: reqwest::Error) -> Self {
        // A body read that fails mid-stream means the connection dropped
        if err.is_connect() || err.is_timeout() || err.is_body() || err.is_decode() {
            Self::NetworkError(err.to_string())
        } else if let Some(status) = err.status() {
            Self::api(status.as_u16(), err.to_string())
        } else {
            Self::UnknownError(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, ListgenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_status() {
        let err = ListgenError::api(401, "Invalid API key");
        assert_eq!(err.to_string(), "API error (401): Invalid API key");
    }

    #[test]
    fn test_config_error_message() {
        let err = ListgenError::config("no API key");
        assert!(matches!(err, ListgenError::ConfigError(_)));
        assert_eq!(err.to_string(), "Configuration error: no API key");
    }
}
