//! `Transport` backed by `reqwest`.
//!
//! Body decodes are genuinely pending: each one awaits the response stream.
//! Request `mode` and `extra` fields have no reqwest equivalent and are
//! ignored.

use async_trait::async_trait;
use tracing::trace;

use crate::decode::{Data, Decoded};
use crate::error::{ApiError, TransportError};
use crate::http::{HttpMethod, HttpRequest, RawResponse, Transport};

#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured client (timeouts, proxies, TLS roots).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    type Response = ReqwestResponse;

    async fn request(&self, request: HttpRequest) -> Result<ReqwestResponse, TransportError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };
        if request.mode.is_some() || !request.extra.is_empty() {
            trace!("reqwest ignores request mode and transport extras");
        }

        let mut builder = self.client.request(method, request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        Ok(ReqwestResponse::new(response))
    }
}

/// A live reqwest response whose body has not been read yet.
#[derive(Debug)]
pub struct ReqwestResponse {
    status: u16,
    status_text: String,
    ok: bool,
    headers: Vec<(String, String)>,
    body: Option<reqwest::Response>,
}

impl ReqwestResponse {
    fn new(response: reqwest::Response) -> Self {
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        Self {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            ok: status.is_success(),
            headers,
            body: Some(response),
        }
    }

    fn read_body<F, Fut>(&mut self, read: F) -> Option<Decoded>
    where
        F: FnOnce(reqwest::Response) -> Fut,
        Fut: std::future::Future<Output = reqwest::Result<Data>> + Send + 'static,
    {
        let decoded = match self.body.take() {
            Some(response) => {
                let fut = read(response);
                Decoded::Pending(Box::pin(async move {
                    fut.await.map_err(|e| ApiError::Decode(e.to_string()))
                }))
            }
            None => Decoded::Ready(Err(ApiError::Decode("body already consumed".to_string()))),
        };
        Some(decoded)
    }
}

impl RawResponse for ReqwestResponse {
    fn status(&self) -> u16 {
        self.status
    }

    fn status_text(&self) -> &str {
        &self.status_text
    }

    fn ok(&self) -> bool {
        self.ok
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn headers(&self) -> Vec<(String, String)> {
        self.headers.clone()
    }

    fn json(&mut self) -> Option<Decoded> {
        self.read_body(|response| async move { response.json().await.map(Data::Json) })
    }

    fn text(&mut self) -> Option<Decoded> {
        self.read_body(|response| async move { response.text().await.map(Data::Text) })
    }

    fn raw(&mut self) -> Option<Decoded> {
        self.read_body(|response| async move { response.bytes().await.map(Data::Raw) })
    }
}
