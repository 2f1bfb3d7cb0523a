//! HTTP boundary types: what the core hands to a transport and what it
//! expects back.
//!
//! # Design
//! The core never performs I/O itself. A `Transport` executes an
//! `HttpRequest` and yields something implementing `RawResponse`; the core
//! only reads status metadata from it and invokes exactly one of its decode
//! operations. `HttpResponse` is a buffered, plain-data `RawResponse` for
//! hosts that execute requests themselves and for tests.
//!
//! All fields use owned types (`String`, `Vec`) so a `ResponseHead` can
//! outlive the response it was read from.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::decode::{Data, Decoded};
use crate::error::{ApiError, TransportError};
use crate::options::RequestMode;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// A fully resolved request as handed to a `Transport`.
///
/// Built by the dispatcher from the merged request options. The query map
/// has already been folded into `url`.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub mode: Option<RequestMode>,
    pub body: Option<String>,
    pub extra: Vec<(String, serde_json::Value)>,
}

/// Status metadata read from a response before its body is decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: u16,
    pub status_text: String,
    /// The transport's own success verdict for `status`.
    pub ok: bool,
    pub headers: Vec<(String, String)>,
}

impl ResponseHead {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// A response produced by a transport.
///
/// The decode operations take `&mut self` because a body may be a
/// single-read stream: the core calls at most one of them, once. An
/// operation the response does not support returns `None`.
pub trait RawResponse: Send {
    fn status(&self) -> u16;

    fn status_text(&self) -> &str;

    fn ok(&self) -> bool;

    fn header(&self, name: &str) -> Option<&str>;

    fn headers(&self) -> Vec<(String, String)>;

    fn json(&mut self) -> Option<Decoded> {
        None
    }

    fn text(&mut self) -> Option<Decoded> {
        None
    }

    fn raw(&mut self) -> Option<Decoded> {
        None
    }

    /// Snapshot of the metadata carried into the outcome.
    fn head(&self) -> ResponseHead {
        ResponseHead {
            status: self.status(),
            status_text: self.status_text().to_string(),
            ok: self.ok(),
            headers: self.headers(),
        }
    }
}

/// Executes requests on behalf of the client.
///
/// Network failures are returned as-is; the core never retries or wraps
/// them beyond `ApiError::Transport`.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    type Response: RawResponse + 'static;

    async fn request(&self, request: HttpRequest) -> Result<Self::Response, TransportError>;
}

/// A fully buffered response described as plain data.
///
/// Every decode operation completes immediately.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            status_text: canonical_reason(status).to_string(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_status_text(mut self, status_text: &str) -> Self {
        self.status_text = status_text.to_string();
        self
    }
}

impl RawResponse for HttpResponse {
    fn status(&self) -> u16 {
        self.status
    }

    fn status_text(&self) -> &str {
        &self.status_text
    }

    fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    fn headers(&self) -> Vec<(String, String)> {
        self.headers.clone()
    }

    fn json(&mut self) -> Option<Decoded> {
        let data = serde_json::from_slice(&self.body)
            .map(Data::Json)
            .map_err(|e| ApiError::Decode(e.to_string()));
        Some(Decoded::Ready(data))
    }

    /// Invalid UTF-8 is replaced with U+FFFD rather than failing.
    fn text(&mut self) -> Option<Decoded> {
        let text = String::from_utf8_lossy(&self.body).into_owned();
        Some(Decoded::Ready(Ok(Data::Text(text))))
    }

    fn raw(&mut self) -> Option<Decoded> {
        Some(Decoded::Ready(Ok(Data::Raw(self.body.clone()))))
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Reason phrase for the statuses a REST backend commonly returns.
fn canonical_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        418 => "I'm a teapot",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "",
    }
}
