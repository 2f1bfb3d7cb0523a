//! Decoded bodies and the strategy-to-operation dispatch.
//!
//! # Design
//! A decode operation may finish immediately (buffered body) or later
//! (streamed body). `Decoded` keeps that distinction visible instead of
//! forcing every transport to allocate a future, and the classifier awaits
//! only when it has to.

use std::fmt;

use bytes::Bytes;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;

use crate::content_type::DecodeStrategy;
use crate::error::{ApiError, Result};
use crate::http::RawResponse;

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    Json(serde_json::Value),
    Text(String),
    Raw(Bytes),
}

impl Data {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Data::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Data::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Data::Raw(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Deserialize a JSON body into a typed value.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        match self {
            Data::Json(value) => {
                T::deserialize(value).map_err(|e| ApiError::Decode(e.to_string()))
            }
            Data::Text(text) => serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string())),
            Data::Raw(bytes) => {
                serde_json::from_slice(bytes).map_err(|e| ApiError::Decode(e.to_string()))
            }
        }
    }
}

/// Result of a decode operation: either available now or still pending.
pub enum Decoded {
    Ready(Result<Data>),
    Pending(BoxFuture<'static, Result<Data>>),
}

impl Decoded {
    pub fn is_pending(&self) -> bool {
        matches!(self, Decoded::Pending(_))
    }

    /// Wait for the decoded value, whichever form it is in.
    pub async fn resolve(self) -> Result<Data> {
        match self {
            Decoded::Ready(data) => data,
            Decoded::Pending(fut) => fut.await,
        }
    }
}

impl fmt::Debug for Decoded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decoded::Ready(data) => f.debug_tuple("Ready").field(data).finish(),
            Decoded::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Invoke the decode operation named by `strategy` on `response`.
///
/// Returns `DecodeUnavailable` when the response does not expose that
/// operation. The result is passed through without being awaited.
pub fn decode<R: RawResponse + ?Sized>(response: &mut R, strategy: DecodeStrategy) -> Result<Decoded> {
    let decoded = match strategy {
        DecodeStrategy::Json => response.json(),
        DecodeStrategy::Text => response.text(),
        DecodeStrategy::Raw => response.raw(),
    };
    decoded.ok_or(ApiError::DecodeUnavailable { strategy })
}
