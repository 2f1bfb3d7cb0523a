//! Error types for the REST client core.
//!
//! # Design
//! Programmer misuse (bad root URL, missing token, missing JSON payload) is a
//! `ConfigError` and is returned synchronously from the call that violated
//! the contract. Everything that happens after the request leaves the client
//! surfaces through the pending response: decode failures, transport
//! failures, and `OkStatus` when the exchange completed with a non-ok status.
//! `OkStatus` keeps whatever body could be decoded so callers can render the
//! server's own error payload.

use thiserror::Error;

use crate::content_type::DecodeStrategy;
use crate::decode::Data;
use crate::http::ResponseHead;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Opaque failure raised by a `Transport`.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Contract violations detected before any request is sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The root URL is not an absolute URL.
    #[error("Invalid root URL: {0}")]
    InvalidRootUrl(String),

    /// `auth` was called without a usable token.
    #[error("Invalid token for authorization")]
    InvalidToken,

    /// A client configuration document could not be parsed.
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    /// A JSON request was built without a payload.
    #[error("No JSON object given for the request body")]
    MissingPayload,
}

/// A completed exchange whose status is not ok.
#[derive(Debug)]
pub struct OkStatusError {
    pub head: ResponseHead,
    /// Best-effort decoded body. `None` only when nothing was decoded.
    pub data: Option<Data>,
    pub message: String,
}

impl OkStatusError {
    pub fn new(head: ResponseHead, data: Option<Data>) -> Self {
        let message = format!(
            "Response has no ok-status ({} - {})",
            head.status, head.status_text
        );
        Self { head, data, message }
    }
}

/// Errors returned by `Client` calls.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The response does not expose the decode operation its content type asks for.
    #[error("Response does not support {strategy} decoding")]
    DecodeUnavailable { strategy: DecodeStrategy },

    /// The body could not be decoded with the selected strategy.
    #[error("decoding failed: {0}")]
    Decode(String),

    #[error("{}", .0.message)]
    OkStatus(Box<OkStatusError>),

    /// Failure from the underlying transport, passed through untouched.
    #[error(transparent)]
    Transport(TransportError),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("query encoding failed: {0}")]
    QueryEncoding(String),

    #[error("could not resolve {url} against the root URL: {reason}")]
    UrlResolution { url: String, reason: String },
}

impl ApiError {
    /// `true` for a completed exchange with a non-ok status.
    pub fn is_ok_status(&self) -> bool {
        matches!(self, Self::OkStatus(_))
    }

    /// Status code of the failed response, if the exchange completed.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::OkStatus(err) => Some(err.head.status),
            _ => None,
        }
    }

    /// Decoded body that came with a non-ok response.
    pub fn data(&self) -> Option<&Data> {
        match self {
            Self::OkStatus(err) => err.data.as_ref(),
            _ => None,
        }
    }

    pub fn response(&self) -> Option<&ResponseHead> {
        match self {
            Self::OkStatus(err) => Some(&err.head),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn head(status: u16, status_text: &str) -> ResponseHead {
        ResponseHead {
            status,
            status_text: status_text.to_string(),
            ok: false,
            headers: Vec::new(),
        }
    }

    #[test]
    fn ok_status_message_embeds_status_and_text() {
        let err = OkStatusError::new(head(404, "Not Found"), None);
        assert_eq!(err.message, "Response has no ok-status (404 - Not Found)");
    }

    #[test]
    fn ok_status_display_is_the_message() {
        let err = ApiError::OkStatus(Box::new(OkStatusError::new(
            head(500, "Internal Server Error"),
            Some(Data::Text("boom".to_string())),
        )));
        assert!(err.to_string().contains("ok-status"));
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.data(), Some(&Data::Text("boom".to_string())));
        assert!(err.is_ok_status());
        let head = err.response().expect("ok-status errors carry the response head");
        assert_eq!(head.status_text, "Internal Server Error");
        assert!(!head.ok);
    }

    #[test]
    fn missing_payload_mentions_json_object() {
        let err = ApiError::from(ConfigError::MissingPayload);
        assert!(err.to_string().contains("No JSON object"));
        assert!(!err.is_ok_status());
        assert_eq!(err.status(), None);
        assert!(err.response().is_none());
    }

    #[test]
    fn transport_errors_display_unchanged() {
        let inner: TransportError = "connection refused".into();
        let err = ApiError::Transport(inner);
        assert_eq!(err.to_string(), "connection refused");
    }
}
