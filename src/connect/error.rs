//! Error types for 1Password Connect API operations.

use thiserror::Error;

/// Result type for Connect API operations.
pub type Result<T> = std::result::Result<T, ConnectError>;

/// Errors reported by a [`super::ConnectClient`].
#[derive(Error, Debug)]
pub enum ConnectError {
    /// The vault or item does not exist upstream.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// The API token was rejected.
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// Any other non-success response.
    #[error("Connect API returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never got a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body did not match the expected shape.
    #[error("unable to decode Connect API response: {0}")]
    Decode(String),

    /// The client could not be built from the supplied host and token.
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl ConnectError {
    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound { message: message.into() }
    }

    /// Create an error for a non-success status.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        match status {
            404 => Self::NotFound { message: message.into() },
            401 | 403 => Self::Unauthorized { message: message.into() },
            _ => Self::Status { status, message: message.into() },
        }
    }
}

impl From<reqwest::Error> for ConnectError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Decode(error.to_string())
        } else if let Some(status) = error.status() {
            Self::status(status.as_u16(), error.to_string())
        } else {
            Self::Transport(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(ConnectError::status(404, "gone"), ConnectError::NotFound { .. }));
        assert!(matches!(ConnectError::status(401, "nope"), ConnectError::Unauthorized { .. }));
        assert!(matches!(ConnectError::status(403, "nope"), ConnectError::Unauthorized { .. }));
        assert!(matches!(
            ConnectError::status(500, "boom"),
            ConnectError::Status { status: 500, .. }
        ));
    }

    #[test]
    fn test_error_display() {
        let err = ConnectError::status(502, "bad gateway");
        assert_eq!(err.to_string(), "Connect API returned status 502: bad gateway");
    }
}
