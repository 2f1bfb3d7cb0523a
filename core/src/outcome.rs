//! Turns a completed exchange into a single outcome.
//!
//! # Design
//! `classify` reads the response exactly once: it snapshots the status
//! metadata, picks a decode strategy from `Content-Type`, and starts the one
//! decode operation. The verdict comes from the response's own `ok` flag,
//! never from re-checking the status code here. The result is always a
//! `PendingResponse`, even when the body was decoded immediately, so callers
//! see one protocol.

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};

use crate::content_type;
use crate::decode::{self, Data};
use crate::error::{ApiError, OkStatusError, Result};
use crate::http::{RawResponse, ResponseHead};

/// A successful exchange: response metadata plus the decoded body.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub head: ResponseHead,
    pub data: Data,
}

impl Response {
    pub fn status(&self) -> u16 {
        self.head.status
    }

    /// Deserialize the body into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        self.data.deserialize()
    }

    pub fn into_data(self) -> Data {
        self.data
    }
}

/// The eventual outcome of a dispatched request.
pub type PendingResponse = BoxFuture<'static, Result<Response>>;

/// Classify `response` as success or ok-status failure.
///
/// Decode failures take precedence over the ok-status failure: if the body
/// cannot be decoded, that error is what the caller sees.
pub fn classify<R: RawResponse>(mut response: R) -> PendingResponse {
    let head = response.head();
    let strategy = content_type::classify(response.header("Content-Type"));
    trace!(status = head.status, %strategy, "selected decode strategy");
    let decoded = decode::decode(&mut response, strategy);
    drop(response);

    Box::pin(async move {
        let data = decoded?.resolve().await?;
        if !head.ok {
            let err = OkStatusError::new(head, Some(data));
            warn!(status = err.head.status, "{}", err.message);
            return Err(ApiError::OkStatus(Box::new(err)));
        }
        debug!(status = head.status, "response classified as ok");
        Ok(Response { head, data })
    })
}
