//! Request and response snapshots passed between the page, the cache and the network.
//!
//! A [`Response`] owns its body as [`Bytes`], so cloning it before a cache
//! write is cheap and leaves the original intact for the caller.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use url::Url;

/// How the page issued a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestMode {
    /// Top-level page navigation.
    Navigate,
    /// Anything else: scripts, styles, images, data files.
    Subresource,
}

/// An outgoing request made by the hosted application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub url: Url,
    pub mode: RequestMode,
    pub headers: Vec<(String, String)>,
}

impl Request {
    /// A plain GET sub-resource request.
    pub fn get(url: Url) -> Self {
        Self { method: "GET".into(), url, mode: RequestMode::Subresource, headers: Vec::new() }
    }

    /// A GET navigation request.
    pub fn navigate(url: Url) -> Self {
        Self { mode: RequestMode::Navigate, ..Self::get(url) }
    }

    pub fn with_method(mut self, method: &str) -> Self {
        self.method = method.trim().to_ascii_uppercase();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }
}

/// Response type as the hosting runtime reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    /// Same-origin network response.
    Basic,
    /// Cross-origin response with readable body.
    Cors,
    /// Cross-origin response with hidden status and body.
    Opaque,
    /// Network error placeholder.
    Error,
    /// Built locally rather than received from the network.
    Default,
}

impl ResponseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseKind::Basic => "basic",
            ResponseKind::Cors => "cors",
            ResponseKind::Opaque => "opaque",
            ResponseKind::Error => "error",
            ResponseKind::Default => "default",
        }
    }
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(ResponseKind::Basic),
            "cors" => Ok(ResponseKind::Cors),
            "opaque" => Ok(ResponseKind::Opaque),
            "error" => Ok(ResponseKind::Error),
            "default" => Ok(ResponseKind::Default),
            other => Err(format!("unknown response kind: {other}")),
        }
    }
}

/// A response snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub status_text: String,
    pub kind: ResponseKind,
    /// Final URL after redirects; `None` for synthesized responses.
    pub url: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl Response {
    /// Build a response locally, without touching the network.
    pub fn synthesized(status: u16, status_text: &str, content_type: &str, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            status_text: status_text.to_string(),
            kind: ResponseKind::Default,
            url: None,
            headers: vec![("content-type".to_string(), content_type.to_string())],
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Only complete same-origin 200 responses are worth keeping offline.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && self.kind == ResponseKind::Basic
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
