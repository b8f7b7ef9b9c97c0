//! Error types for the DevPay client.
//!
//! This module defines every error a client call can produce. All errors
//! implement the standard [`std::error::Error`] trait via [`thiserror::Error`].
//!
//! # Error Categories
//!
//! - **Local validation** ([`DevPayError::MissingParameter`],
//!   [`DevPayError::InvalidInput`], [`DevPayError::Config`]): raised before any
//!   network I/O happens
//! - **Remote errors** ([`DevPayError::Card`], [`DevPayError::InvalidRequest`],
//!   [`DevPayError::Api`], [`DevPayError::Connection`],
//!   [`DevPayError::UnknownRemote`]): reported by the API in the `error` object
//!   of a response body
//! - **Transport errors** ([`DevPayError::Http`],
//!   [`DevPayError::MalformedResponse`]): the exchange itself failed
//!
//! # Examples
//!
//! ```
//! use devpay::error::{ApiErrorBody, DevPayError, RemoteErrorKind};
//!
//! let body = ApiErrorBody {
//!     kind: RemoteErrorKind::CardError,
//!     message: "Your card was declined.".to_owned(),
//!     code: None,
//!     param: None,
//! };
//!
//! let err = DevPayError::from_remote(body);
//! assert!(err.is_card_error());
//! assert_eq!(err.message(), "Your card was declined.");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, DevPayError>;

/// Error category reported by the API in `error.type`.
///
/// Unrecognized strings are kept in [`RemoteErrorKind::Unknown`] rather than
/// rejected, so a new server-side category never turns into a decode failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RemoteErrorKind {
    /// `card_error`: the card was declined or is invalid.
    CardError,
    /// `invalid_request_error`: the request had invalid parameters.
    InvalidRequestError,
    /// `api_error`: the API failed internally.
    ApiError,
    /// `api_connection_error`: the API could not reach an upstream processor.
    ConnectionError,
    /// Any other type string.
    Unknown(String),
}

impl RemoteErrorKind {
    /// Returns the wire name of this kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::CardError => "card_error",
            Self::InvalidRequestError => "invalid_request_error",
            Self::ApiError => "api_error",
            Self::ConnectionError => "api_connection_error",
            Self::Unknown(other) => other,
        }
    }
}

impl From<&str> for RemoteErrorKind {
    fn from(value: &str) -> Self {
        match value {
            "card_error" => Self::CardError,
            "invalid_request_error" => Self::InvalidRequestError,
            "api_error" => Self::ApiError,
            "api_connection_error" => Self::ConnectionError,
            other => Self::Unknown(other.to_owned()),
        }
    }
}

impl From<String> for RemoteErrorKind {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<RemoteErrorKind> for String {
    fn from(kind: RemoteErrorKind) -> Self {
        kind.as_str().to_owned()
    }
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for RemoteErrorKind {
    fn default() -> Self {
        Self::Unknown(String::new())
    }
}

/// The `error` object of a failed API response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Error category.
    #[serde(rename = "type", default)]
    pub kind: RemoteErrorKind,
    /// Human-readable message from the API.
    #[serde(default)]
    pub message: String,
    /// Machine-readable code, when the API supplies one (e.g. `card_declined`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Name of the offending parameter, when the API supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
}

/// Errors that can occur in DevPay client operations.
///
/// # Error Recovery
///
/// - **Missing parameters** ([`MissingParameter`](Self::MissingParameter)): fix the call
/// - **Card errors** ([`Card`](Self::Card)): surface the message to the cardholder
/// - **Invalid requests** ([`InvalidRequest`](Self::InvalidRequest)): fix the parameters
/// - **Connection and API errors** ([`Connection`](Self::Connection), [`Api`](Self::Api)):
///   transient; the caller may retry
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum DevPayError {
    /// A required parameter was absent. Raised before any request is sent.
    ///
    /// # Examples
    ///
    /// ```
    /// use devpay::error::DevPayError;
    ///
    /// let err = DevPayError::MissingParameter("id".to_owned());
    /// assert_eq!(err.to_string(), "Missing required param: id");
    /// assert!(err.is_invalid_request());
    /// ```
    #[error("Missing required param: {0}")]
    MissingParameter(String),

    /// The card was declined or could not be charged.
    #[error("Card error: {message}")]
    Card {
        /// Message from the API.
        message: String,
        /// Decline code, if any.
        code: Option<String>,
    },

    /// The API rejected the request parameters.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Message from the API.
        message: String,
        /// Offending parameter, if any.
        param: Option<String>,
    },

    /// The API reported an internal failure.
    #[error("API error: {message}")]
    Api {
        /// Message from the API.
        message: String,
    },

    /// The API could not be reached, or reported an upstream connection failure.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The API reported an error type this client does not recognize.
    #[error("Unrecognized API error type '{kind}': {message}")]
    UnknownRemote {
        /// The raw `error.type` string.
        kind: String,
        /// Message from the API.
        message: String,
    },

    /// HTTP request failed for a reason other than connectivity.
    #[error("HTTP request failed: {0}")]
    Http(reqwest::Error),

    /// The response body was not a JSON object.
    #[error("Malformed response (HTTP {status}): {reason}")]
    MalformedResponse {
        /// HTTP status of the response.
        status: u16,
        /// Why the body could not be used.
        reason: String,
    },

    /// Client configuration is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Caller input is invalid (e.g. a non-object parameter value).
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl DevPayError {
    /// Maps a server-reported error object onto the matching variant.
    pub fn from_remote(body: ApiErrorBody) -> Self {
        let ApiErrorBody { kind, message, code, param } = body;
        match kind {
            RemoteErrorKind::CardError => Self::Card { message, code },
            RemoteErrorKind::InvalidRequestError => Self::InvalidRequest { message, param },
            RemoteErrorKind::ApiError => Self::Api { message },
            RemoteErrorKind::ConnectionError => Self::Connection(message),
            RemoteErrorKind::Unknown(kind) => Self::UnknownRemote { kind, message },
        }
    }

    /// Returns true for card declines.
    #[must_use]
    pub fn is_card_error(&self) -> bool {
        matches!(self, Self::Card { .. })
    }

    /// Returns true for both local and remote invalid-request errors.
    #[must_use]
    pub fn is_invalid_request(&self) -> bool {
        matches!(self, Self::MissingParameter(_) | Self::InvalidRequest { .. })
    }

    /// Returns true for errors a caller may reasonably retry.
    ///
    /// The client itself never retries.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Api { .. })
    }

    /// Returns the bare message without the category prefix.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Card { message, .. }
            | Self::InvalidRequest { message, .. }
            | Self::Api { message }
            | Self::UnknownRemote { message, .. }
            | Self::Connection(message) => message.clone(),
            Self::MissingParameter(_)
            | Self::Http(_)
            | Self::MalformedResponse { .. }
            | Self::Config(_)
            | Self::InvalidInput(_) => self.to_string(),
        }
    }
}

impl From<reqwest::Error> for DevPayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::Connection(err.to_string())
        } else {
            Self::Http(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(kind: &str, message: &str) -> ApiErrorBody {
        ApiErrorBody {
            kind: RemoteErrorKind::from(kind),
            message: message.to_owned(),
            code: None,
            param: None,
        }
    }

    #[test]
    fn test_missing_parameter_display() {
        let error = DevPayError::MissingParameter("amount".into());
        assert_eq!(error.to_string(), "Missing required param: amount");
        assert!(error.is_invalid_request());
        assert!(!error.is_retryable());
    }

    #[test]
    fn test_remote_kind_parsing() {
        assert_eq!(RemoteErrorKind::from("card_error"), RemoteErrorKind::CardError);
        assert_eq!(
            RemoteErrorKind::from("invalid_request_error"),
            RemoteErrorKind::InvalidRequestError
        );
        assert_eq!(RemoteErrorKind::from("api_error"), RemoteErrorKind::ApiError);
        assert_eq!(
            RemoteErrorKind::from("api_connection_error"),
            RemoteErrorKind::ConnectionError
        );
        assert_eq!(
            RemoteErrorKind::from("rate_limit_error"),
            RemoteErrorKind::Unknown("rate_limit_error".to_owned())
        );
    }

    #[test]
    fn test_remote_kind_as_str_matches_wire_name() {
        for name in ["card_error", "invalid_request_error", "api_error", "api_connection_error"] {
            assert_eq!(RemoteErrorKind::from(name).as_str(), name);
        }
        assert_eq!(RemoteErrorKind::from("something_new").to_string(), "something_new");
    }

    #[test]
    fn test_from_remote_card() {
        let err = DevPayError::from_remote(body("card_error", "Your card was declined."));
        assert!(matches!(
            &err,
            DevPayError::Card { message, code: None } if message == "Your card was declined."
        ));
        assert_eq!(err.to_string(), "Card error: Your card was declined.");
    }

    #[test]
    fn test_from_remote_invalid_request_keeps_param() {
        let mut remote = body("invalid_request_error", "No such charge");
        remote.param = Some("id".to_owned());
        let err = DevPayError::from_remote(remote);
        assert!(err.is_invalid_request());
        assert!(matches!(err, DevPayError::InvalidRequest { param: Some(ref p), .. } if p == "id"));
    }

    #[test]
    fn test_from_remote_api_and_connection_are_retryable() {
        assert!(DevPayError::from_remote(body("api_error", "boom")).is_retryable());
        assert!(DevPayError::from_remote(body("api_connection_error", "down")).is_retryable());
    }

    #[test]
    fn test_from_remote_unknown_kind() {
        let err = DevPayError::from_remote(body("fraud_error", "Suspicious"));
        assert!(matches!(
            &err,
            DevPayError::UnknownRemote { kind, message } if kind == "fraud_error" && message == "Suspicious"
        ));
        assert_eq!(err.message(), "Suspicious");
    }

    #[test]
    fn test_error_body_deserialize_defaults() {
        let parsed: ApiErrorBody = serde_json::from_str(r#"{"type": "card_error"}"#).unwrap();
        assert_eq!(parsed.kind, RemoteErrorKind::CardError);
        assert!(parsed.message.is_empty());

        let parsed: ApiErrorBody = serde_json::from_str(r#"{"message": "odd"}"#).unwrap();
        assert_eq!(parsed.kind, RemoteErrorKind::Unknown(String::new()));
        assert_eq!(parsed.message, "odd");
    }

    #[test]
    fn test_error_body_serialize_uses_wire_type() {
        let json = serde_json::to_value(body("card_error", "declined")).unwrap();
        assert_eq!(json["type"], "card_error");
        assert_eq!(json["message"], "declined");
        assert!(json.get("code").is_none());
    }

    #[test]
    fn test_config_error_message_includes_prefix() {
        let err = DevPayError::Config("bad url".to_owned());
        assert_eq!(err.message(), "Invalid configuration: bad url");
    }
}
