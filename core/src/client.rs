//! The public client: a root URL, default options, and a transport.
//!
//! # Design
//! `Client` carries no mutable state. Every call merges its options over
//! the stored defaults into a fresh value, and `auth` returns a new client
//! rather than modifying this one. The transport sits behind an `Arc`, so
//! derived clients share the connection machinery but not configuration.
//!
//! Contract violations (missing JSON payload, missing token) fail
//! synchronously with `ConfigError`; everything else is reported through
//! the returned `PendingResponse`.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use url::Url;

use crate::dispatch;
use crate::error::{ApiError, ConfigError, Result};
use crate::http::{HttpMethod, Transport};
use crate::options::{merge, ClientConfig, RequestMode, RequestOptions};
use crate::outcome::PendingResponse;

const APPLICATION_JSON: &str = "application/json";

/// Client for a REST-style backend rooted at one URL.
pub struct Client<T> {
    root: Url,
    defaults: RequestOptions,
    transport: Arc<T>,
}

impl<T> Clone for Client<T> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            defaults: self.defaults.clone(),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T> fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("root", &self.root.as_str())
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> Client<T> {
    /// Create a client. `root_url` must be an absolute URL.
    pub fn new(root_url: &str, defaults: RequestOptions, transport: T) -> Result<Self> {
        let root = Url::parse(root_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ConfigError::InvalidRootUrl(root_url.to_string()))?;
        Ok(Self {
            root,
            defaults,
            transport: Arc::new(transport),
        })
    }

    pub fn from_config(config: ClientConfig, transport: T) -> Result<Self> {
        Self::new(&config.root_url, config.defaults, transport)
    }

    pub fn root_url(&self) -> &str {
        self.root.as_str()
    }

    pub fn defaults(&self) -> &RequestOptions {
        &self.defaults
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Dispatch `url` with `options` merged over the defaults.
    pub fn fetch(&self, url: &str, options: RequestOptions) -> PendingResponse {
        dispatch::dispatch(
            Arc::clone(&self.transport),
            &self.root,
            url,
            &self.defaults,
            &options,
        )
    }

    pub fn get(&self, url: &str, options: RequestOptions) -> PendingResponse {
        self.fetch(url, options.with_method(HttpMethod::Get))
    }

    pub fn post(&self, url: &str, options: RequestOptions) -> PendingResponse {
        self.fetch(url, options.with_method(HttpMethod::Post))
    }

    pub fn put(&self, url: &str, options: RequestOptions) -> PendingResponse {
        self.fetch(url, options.with_method(HttpMethod::Put))
    }

    pub fn patch(&self, url: &str, options: RequestOptions) -> PendingResponse {
        self.fetch(url, options.with_method(HttpMethod::Patch))
    }

    pub fn delete(&self, url: &str, options: RequestOptions) -> PendingResponse {
        self.fetch(url, options.with_method(HttpMethod::Delete))
    }

    /// Send `json` as the request body.
    ///
    /// `None` fails with `MissingPayload`; a JSON `null` is a valid payload.
    /// `Accept` and `Content-Type` are forced to `application/json`,
    /// replacing whatever the caller or the defaults set for those two
    /// headers, in any letter case.
    pub fn fetch_with_json<J>(
        &self,
        url: &str,
        json: Option<&J>,
        options: RequestOptions,
    ) -> Result<PendingResponse>
    where
        J: Serialize + ?Sized,
    {
        let json = json.ok_or(ConfigError::MissingPayload)?;
        let body = serde_json::to_string(json).map_err(|e| ApiError::Serialization(e.to_string()))?;

        let mut options = options.with_body(body);
        options.force_header("Accept", APPLICATION_JSON);
        options.force_header("Content-Type", APPLICATION_JSON);

        let mut defaults = self.defaults.clone();
        defaults.headers.retain(|name, _| {
            !name.eq_ignore_ascii_case("Accept") && !name.eq_ignore_ascii_case("Content-Type")
        });
        Ok(dispatch::dispatch(
            Arc::clone(&self.transport),
            &self.root,
            url,
            &defaults,
            &options,
        ))
    }

    pub fn post_json<J>(&self, url: &str, json: Option<&J>, options: RequestOptions) -> Result<PendingResponse>
    where
        J: Serialize + ?Sized,
    {
        self.fetch_with_json(url, json, options.with_method(HttpMethod::Post))
    }

    pub fn put_json<J>(&self, url: &str, json: Option<&J>, options: RequestOptions) -> Result<PendingResponse>
    where
        J: Serialize + ?Sized,
    {
        self.fetch_with_json(url, json, options.with_method(HttpMethod::Put))
    }

    pub fn patch_json<J>(&self, url: &str, json: Option<&J>, options: RequestOptions) -> Result<PendingResponse>
    where
        J: Serialize + ?Sized,
    {
        self.fetch_with_json(url, json, options.with_method(HttpMethod::Patch))
    }

    /// Derive a client that sends `Authorization: Token <token>` in CORS mode.
    ///
    /// `None` fails with `InvalidToken`; any string, empty included, is
    /// sent as given. The root URL and transport carry over; this client is
    /// left unchanged.
    pub fn auth(&self, token: Option<&str>) -> Result<Self> {
        let token = token.ok_or(ConfigError::InvalidToken)?;
        let auth = RequestOptions::new()
            .with_header("Authorization", &format!("Token {token}"))
            .with_mode(RequestMode::Cors);
        Ok(Self {
            root: self.root.clone(),
            defaults: merge(&self.defaults, &auth),
            transport: Arc::clone(&self.transport),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use futures::executor::block_on;

    use super::*;
    use crate::decode::Data;
    use crate::error::TransportError;
    use crate::http::{HttpRequest, HttpResponse};

    /// Records every request and answers with a fixed response.
    struct Recorder {
        response: HttpResponse,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl Recorder {
        fn new(response: HttpResponse) -> Self {
            Self {
                response,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn last(&self) -> HttpRequest {
            self.seen.lock().unwrap().last().cloned().expect("no request recorded")
        }
    }

    #[async_trait]
    impl Transport for Recorder {
        type Response = HttpResponse;

        async fn request(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
            self.seen.lock().unwrap().push(request);
            Ok(self.response.clone())
        }
    }

    struct Unreachable;

    #[async_trait]
    impl Transport for Unreachable {
        type Response = HttpResponse;

        async fn request(&self, _request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
            Err("connection refused".into())
        }
    }

    fn client() -> Client<Recorder> {
        let response = HttpResponse::new(200, "get-request").with_header("Content-Type", "text/plain");
        Client::new("http://example.com", RequestOptions::new(), Recorder::new(response)).unwrap()
    }

    fn header<'a>(request: &'a HttpRequest, name: &str) -> Option<&'a str> {
        request
            .headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn get_resolves_with_decoded_text() {
        let client = client();
        let response = block_on(client.get("/sample", RequestOptions::new())).unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.into_data(), Data::Text("get-request".to_string()));

        let req = client.transport().last();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://example.com/sample");
    }

    #[test]
    fn verbs_set_their_method() {
        let client = client();
        block_on(client.post("/a", RequestOptions::new())).unwrap();
        assert_eq!(client.transport().last().method, HttpMethod::Post);
        block_on(client.put("/a", RequestOptions::new())).unwrap();
        assert_eq!(client.transport().last().method, HttpMethod::Put);
        block_on(client.patch("/a", RequestOptions::new())).unwrap();
        assert_eq!(client.transport().last().method, HttpMethod::Patch);
        block_on(client.delete("/a", RequestOptions::new())).unwrap();
        assert_eq!(client.transport().last().method, HttpMethod::Delete);
    }

    #[test]
    fn invalid_root_url_is_rejected() {
        let err = Client::new("not a url", RequestOptions::new(), Unreachable).unwrap_err();
        assert!(matches!(err, ApiError::Config(ConfigError::InvalidRootUrl(_))));
        let err = Client::new("mailto:someone@example.com", RequestOptions::new(), Unreachable)
            .unwrap_err();
        assert!(matches!(err, ApiError::Config(ConfigError::InvalidRootUrl(_))));
    }

    #[test]
    fn fetch_with_json_requires_a_payload() {
        let result = client().fetch_with_json::<serde_json::Value>("/a", None, RequestOptions::new());
        let err = result.err().expect("missing payload must fail");
        assert!(err.to_string().contains("No JSON object"));
    }

    #[test]
    fn fetch_with_json_accepts_null() {
        let client = client();
        let pending = client
            .fetch_with_json("/a", Some(&serde_json::Value::Null), RequestOptions::new())
            .unwrap();
        block_on(pending).unwrap();
        assert_eq!(client.transport().last().body.as_deref(), Some("null"));
    }

    #[test]
    fn json_headers_override_caller_headers() {
        let client = client();
        let options = RequestOptions::new()
            .with_header("content-type", "text/plain")
            .with_header("Accept", "text/html")
            .with_header("X-Keep", "yes");
        let pending = client
            .post_json("/notes", Some(&serde_json::json!({ "title": "a" })), options)
            .unwrap();
        block_on(pending).unwrap();

        let req = client.transport().last();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(header(&req, "Accept"), Some(APPLICATION_JSON));
        assert_eq!(header(&req, "Content-Type"), Some(APPLICATION_JSON));
        assert_eq!(header(&req, "content-type"), None);
        assert_eq!(header(&req, "X-Keep"), Some("yes"));
        assert_eq!(req.body.as_deref(), Some(r#"{"title":"a"}"#));
    }

    #[test]
    fn put_json_sets_method() {
        let client = client();
        block_on(client.put_json("/notes/1", Some(&[1, 2, 3]), RequestOptions::new()).unwrap()).unwrap();
        let req = client.transport().last();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.body.as_deref(), Some("[1,2,3]"));
    }

    #[test]
    fn auth_derives_a_new_client() {
        let parent = client();
        let child = parent.auth(Some("abc")).unwrap();

        block_on(child.get("/me", RequestOptions::new())).unwrap();
        let req = child.transport().last();
        assert_eq!(header(&req, "Authorization"), Some("Token abc"));
        assert_eq!(req.mode, Some(RequestMode::Cors));
        assert_eq!(req.url, "http://example.com/me");

        assert_eq!(child.root_url(), parent.root_url());
        assert!(parent.defaults().headers.is_empty());
        assert_eq!(parent.defaults().mode, None);
    }

    #[test]
    fn auth_rejects_a_missing_token() {
        let err = client().auth(None).unwrap_err();
        assert!(matches!(err, ApiError::Config(ConfigError::InvalidToken)));
    }

    #[test]
    fn auth_accepts_an_empty_token() {
        let client = client();
        let child = client.auth(Some("")).unwrap();
        block_on(child.get("/me", RequestOptions::new())).unwrap();
        assert_eq!(header(&client.transport().last(), "Authorization"), Some("Token "));
    }

    #[test]
    fn json_headers_override_case_variant_defaults() {
        let response = HttpResponse::new(200, "").with_header("Content-Type", "text/plain");
        let defaults = RequestOptions::new()
            .with_header("content-type", "text/plain")
            .with_header("ACCEPT", "text/html")
            .with_header("X-Default", "kept");
        let client = Client::new("http://example.com", defaults, Recorder::new(response)).unwrap();

        block_on(client.post_json("/a", Some(&1), RequestOptions::new()).unwrap()).unwrap();
        let req = client.transport().last();
        let content_types: Vec<_> = req
            .headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case("Content-Type"))
            .collect();
        assert_eq!(content_types.len(), 1);
        assert_eq!(header(&req, "Content-Type"), Some(APPLICATION_JSON));
        assert_eq!(header(&req, "Accept"), Some(APPLICATION_JSON));
        assert_eq!(header(&req, "ACCEPT"), None);
        assert_eq!(header(&req, "X-Default"), Some("kept"));

        // plain calls still see the stored defaults
        assert_eq!(client.defaults().headers["content-type"], "text/plain");
        block_on(client.get("/b", RequestOptions::new())).unwrap();
        assert_eq!(header(&client.transport().last(), "content-type"), Some("text/plain"));
    }

    #[test]
    fn transport_failures_pass_through() {
        let client = Client::new("http://example.com", RequestOptions::new(), Unreachable).unwrap();
        let err = block_on(client.get("/x", RequestOptions::new())).unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert_eq!(err.to_string(), "connection refused");
    }

    #[test]
    fn defaults_are_merged_under_call_options() {
        let response = HttpResponse::new(200, "").with_header("Content-Type", "text/plain");
        let defaults = RequestOptions::new()
            .with_header("Accept", "text/plain")
            .with_query("lang", "en");
        let client = Client::new("http://example.com/api/", defaults, Recorder::new(response)).unwrap();

        let call = RequestOptions::new().with_query("page", "2");
        block_on(client.get("notes", call)).unwrap();
        let req = client.transport().last();
        assert_eq!(req.url, "http://example.com/api/notes?lang=en&page=2");
        assert_eq!(header(&req, "Accept"), Some("text/plain"));
        assert_eq!(client.defaults().query.len(), 1);
    }

    #[test]
    fn from_config_uses_root_and_defaults() {
        let config = ClientConfig::from_json_str(
            r#"{ "rootUrl": "http://example.com", "defaults": { "mode": "same-origin" } }"#,
        )
        .unwrap();
        let client = Client::from_config(config, Unreachable).unwrap();
        assert_eq!(client.root_url(), "http://example.com/");
        assert_eq!(client.defaults().mode, Some(RequestMode::SameOrigin));
    }
}
