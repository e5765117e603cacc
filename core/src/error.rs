//! Error types for the ConnectWise API client.
//!
//! # Design
//! Every failure mode gets its own variant so callers can tell "the service
//! answered with JSON `null`" apart from "the request never completed" or
//! "the body was not JSON." `NotFound` is split out of `HttpError` because
//! lookups by id are the most common call and callers branch on it.

use thiserror::Error;

/// Errors returned by `ConnectwiseClient` and its configuration loaders.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required configuration key had no value.
    #[error("missing configuration key `{0}`")]
    MissingConfig(String),

    /// Configuration was present but could not be interpreted.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The method string does not name an HTTP verb the client supports.
    #[error("unsupported HTTP method `{0}`")]
    UnsupportedMethod(String),

    /// DNS, TLS, connect, timeout or I/O failure before a response was read.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// The server returned 404.
    #[error("resource not found: {body}")]
    NotFound { body: String },

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// A 2xx response whose body is not valid JSON, or does not fit the
    /// type requested from `request_as`. The body is kept as received.
    #[error("response decoding failed: {message}")]
    Decode { message: String, body: String },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound { .. } => Some(404),
            ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_status_and_body() {
        let err = ApiError::HttpError {
            status: 401,
            body: "denied".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 401: denied");
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn transport_errors_have_no_status() {
        let err = ApiError::Transport {
            message: "connection refused".to_string(),
        };
        assert_eq!(err.status(), None);
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn missing_config_names_the_key() {
        let err = ApiError::MissingConfig("connectwise.clientId".to_string());
        assert_eq!(err.to_string(), "missing configuration key `connectwise.clientId`");
    }
}
