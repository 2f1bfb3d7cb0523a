//! Request options and their merge rules.
//!
//! # Design
//! `RequestOptions` is a plain value. `merge` never touches its inputs and
//! always returns a fresh value, so a client's defaults cannot be changed
//! through a merge result and derived clients share nothing with their
//! parent. Maps are `BTreeMap` so the serialized query string and header
//! order are deterministic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ConfigError, Result};
use crate::http::HttpMethod;

/// Fetch-style request mode, forwarded to the transport untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    Cors,
    NoCors,
    SameOrigin,
    Navigate,
}

/// Per-call or default request configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequestOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    pub headers: BTreeMap<String, String>,
    pub query: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<RequestMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Transport-specific fields the core does not interpret.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_query(mut self, name: &str, value: &str) -> Self {
        self.query.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_extra(mut self, name: &str, value: serde_json::Value) -> Self {
        self.extra.insert(name.to_string(), value);
        self
    }

    /// Set a header, replacing any existing entry whose name differs only in case.
    pub(crate) fn force_header(&mut self, name: &str, value: &str) {
        self.headers.retain(|key, _| !key.eq_ignore_ascii_case(name));
        self.headers.insert(name.to_string(), value.to_string());
    }
}

/// Merge `overrides` onto `base`.
///
/// `headers` and `query` are unioned key by key; every other field is taken
/// from `overrides` when it is set there. Neither input is modified.
pub fn merge(base: &RequestOptions, overrides: &RequestOptions) -> RequestOptions {
    let mut headers = base.headers.clone();
    headers.extend(overrides.headers.iter().map(|(k, v)| (k.clone(), v.clone())));

    let mut query = base.query.clone();
    query.extend(overrides.query.iter().map(|(k, v)| (k.clone(), v.clone())));

    let mut extra = base.extra.clone();
    extra.extend(overrides.extra.iter().map(|(k, v)| (k.clone(), v.clone())));

    RequestOptions {
        method: overrides.method.or(base.method),
        headers,
        query,
        mode: overrides.mode.or(base.mode),
        body: overrides.body.clone().or_else(|| base.body.clone()),
        extra,
    }
}

/// Everything needed to construct a `Client`, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub root_url: String,
    #[serde(default)]
    pub defaults: RequestOptions,
}

impl ClientConfig {
    pub fn new(root_url: &str) -> Self {
        Self {
            root_url: root_url.to_string(),
            defaults: RequestOptions::default(),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| ApiError::Config(ConfigError::InvalidConfig(e.to_string())))
    }
}
