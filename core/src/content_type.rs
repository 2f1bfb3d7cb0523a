//! Maps a response's `Content-Type` to the decode strategy for its body.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a response body is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeStrategy {
    Json,
    Text,
    Raw,
}

impl DecodeStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecodeStrategy::Json => "json",
            DecodeStrategy::Text => "text",
            DecodeStrategy::Raw => "raw",
        }
    }
}

impl fmt::Display for DecodeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pick the decode strategy for a content type.
///
/// First match wins: absent → `Raw`, contains `json` anywhere
/// (case-sensitive) → `Json`, starts with `text/` → `Text`, else `Raw`.
pub fn classify(content_type: Option<&str>) -> DecodeStrategy {
    match content_type {
        None => DecodeStrategy::Raw,
        Some(ct) if ct.contains("json") => DecodeStrategy::Json,
        Some(ct) if ct.starts_with("text/") => DecodeStrategy::Text,
        Some(_) => DecodeStrategy::Raw,
    }
}
