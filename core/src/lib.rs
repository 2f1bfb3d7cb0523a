//! Thin client layer for REST-style backends.
//!
//! # Overview
//! A `Client` owns a root URL and default request options. Each call merges
//! its own options over the defaults, resolves the URL against the root,
//! hands the request to a pluggable `Transport`, and classifies the response:
//! the body is decoded according to its `Content-Type` (JSON, text, or raw
//! bytes) and the exchange resolves to a `Response` or fails with an
//! `ApiError` that still carries the decoded body.
//!
//! # Design
//! - The core does no I/O of its own. `Transport` and `RawResponse` are the
//!   only seams; `ReqwestTransport` (feature `reqwest`) is the stock one and
//!   `HttpResponse` is a buffered response for hosts that do their own I/O.
//! - Every call returns a `PendingResponse`, even when the body was
//!   available immediately.
//! - Options are values: merges and `Client::auth` always produce fresh
//!   copies, so derived clients never affect their parent.

pub mod client;
pub mod content_type;
pub mod decode;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod options;
pub mod outcome;
#[cfg(feature = "reqwest")]
pub mod transport;

pub use client::Client;
pub use content_type::DecodeStrategy;
pub use decode::{Data, Decoded};
pub use error::{ApiError, ConfigError, OkStatusError, Result, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, RawResponse, ResponseHead, Transport};
pub use options::{ClientConfig, RequestMode, RequestOptions};
pub use outcome::{PendingResponse, Response};
#[cfg(feature = "reqwest")]
pub use transport::{ReqwestResponse, ReqwestTransport};
