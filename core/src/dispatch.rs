//! Builds the outgoing request and runs it through the transport.
//!
//! # Design
//! Request building is pure: `build_request` merges options, folds the query
//! map into the URL, and resolves it against the root. `dispatch` adds the
//! single suspension point on the transport and pipes its response through
//! `outcome::classify`. Transport failures are passed up unchanged.

use std::sync::Arc;

use tracing::debug;
use url::Url;

use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, Transport};
use crate::options::{merge, RequestOptions};
use crate::outcome::{self, PendingResponse};

/// `true` for URLs that are used as-is instead of being resolved.
///
/// Deliberately simple: only `http://` and a leading `www` count.
pub fn is_absolute(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("www")
}

/// Resolve `url` against `root` unless it already looks absolute.
pub fn resolve(root: &Url, url: &str) -> Result<String> {
    if is_absolute(url) {
        return Ok(url.to_string());
    }
    root.join(url)
        .map(String::from)
        .map_err(|e| ApiError::UrlResolution {
            url: url.to_string(),
            reason: e.to_string(),
        })
}

/// Append `?<query>` when the merged options carry query parameters.
pub fn append_query(url: &str, options: &RequestOptions) -> Result<String> {
    if options.query.is_empty() {
        return Ok(url.to_string());
    }
    let query = serde_urlencoded::to_string(&options.query)
        .map_err(|e| ApiError::QueryEncoding(e.to_string()))?;
    Ok(format!("{url}?{query}"))
}

/// Produce the transport request for `url` with `call` merged over `defaults`.
pub fn build_request(
    root: &Url,
    url: &str,
    defaults: &RequestOptions,
    call: &RequestOptions,
) -> Result<HttpRequest> {
    let options = merge(defaults, call);
    let url = resolve(root, &append_query(url, &options)?)?;

    let RequestOptions {
        method,
        headers,
        mode,
        body,
        extra,
        ..
    } = options;

    Ok(HttpRequest {
        method: method.unwrap_or(HttpMethod::Get),
        url,
        headers: headers.into_iter().collect(),
        mode,
        body,
        extra: extra.into_iter().collect(),
    })
}

/// Send the request and classify whatever comes back.
pub fn dispatch<T: Transport>(
    transport: Arc<T>,
    root: &Url,
    url: &str,
    defaults: &RequestOptions,
    call: &RequestOptions,
) -> PendingResponse {
    let request = build_request(root, url, defaults, call);

    Box::pin(async move {
        let request = request?;
        debug!(method = request.method.as_str(), url = %request.url, "dispatching request");
        let response = transport
            .request(request)
            .await
            .map_err(ApiError::Transport)?;
        outcome::classify(response).await
    })
}
