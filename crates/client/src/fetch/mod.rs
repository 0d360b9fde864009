//! reqwest-backed network for the interceptor.
//!
//! ### Behavior
//! - Any response the server produced is returned as-is, error statuses
//!   included; only transport failures become `Err`.
//! - Response kind is `basic` when the final URL (after redirects) is on
//!   the application origin, `cors` otherwise.
//! - Max redirects: 5
//! - Bodies are read whole; whether to keep one is the caller's call.

pub mod url;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Method, header};

use lisboa_core::{AppConfig, Error, Network, Request, Response, ResponseKind};

pub use self::url::{UrlError, canonicalize, resolve, same_origin};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "lisboa-sw/0.1")
    pub user_agent: String,

    /// Transport timeout (default: 10s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,

    /// Application origin used to tell basic from cross-origin responses
    pub origin: Option<::url::Url>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "lisboa-sw/0.1".to_string(),
            timeout: Duration::from_millis(10_000),
            max_redirects: 5,
            origin: None,
        }
    }
}

impl FetchConfig {
    /// Build from the application configuration.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, Error> {
        let origin = config.origin_url().map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Ok(Self {
            user_agent: config.user_agent.clone(),
            timeout: config.timeout(),
            origin: Some(origin),
            ..Default::default()
        })
    }
}

/// HTTP client implementing [`Network`].
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn kind_for(&self, final_url: &::url::Url) -> ResponseKind {
        match &self.config.origin {
            Some(origin) if same_origin(origin, final_url) => ResponseKind::Basic,
            Some(_) => ResponseKind::Cors,
            None => ResponseKind::Basic,
        }
    }
}

#[async_trait]
impl Network for FetchClient {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let start = Instant::now();
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|e| Error::InvalidInput(format!("invalid method {}: {}", request.method, e)))?;

        let mut builder = self.http.request(method, request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::FetchTimeout(format!("{}: {}", request.url, e))
            } else {
                Error::Network(format!("{}: {}", request.url, e))
            }
        })?;

        let status = response.status();
        let final_url = response.url().clone();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter(|(name, _)| name.as_str() != header::SET_COOKIE.as_str())
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("failed to read response: {}", e)))?;

        tracing::debug!(
            "fetched {} {} -> {} in {}ms ({} bytes)",
            request.method,
            request.url,
            status.as_u16(),
            start.elapsed().as_millis(),
            body.len()
        );

        Ok(Response {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            kind: self.kind_for(&final_url),
            url: Some(final_url.to_string()),
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client_for(server: &MockServer) -> FetchClient {
        let origin = ::url::Url::parse(&server.base_url()).unwrap();
        FetchClient::new(FetchConfig { origin: Some(origin), ..Default::default() }).unwrap()
    }

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.user_agent, "lisboa-sw/0.1");
        assert_eq!(config.timeout, Duration::from_millis(10_000));
        assert_eq!(config.max_redirects, 5);
        assert!(config.origin.is_none());
    }

    #[test]
    fn test_fetch_config_from_app_config() {
        let app = AppConfig { origin: "https://trip.example".into(), timeout_ms: 2500, ..Default::default() };
        let config = FetchConfig::from_app_config(&app).unwrap();
        assert_eq!(config.timeout, Duration::from_millis(2500));
        assert_eq!(config.origin.unwrap().host_str(), Some("trip.example"));
    }

    #[tokio::test]
    async fn test_fetch_same_origin_is_basic() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/data/flights.json");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"{"flights":[]}"#);
            })
            .await;

        let client = client_for(&server);
        let url = ::url::Url::parse(&server.url("/data/flights.json")).unwrap();
        let response = client.fetch(&Request::get(url)).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.status_text, "OK");
        assert_eq!(response.kind, ResponseKind::Basic);
        assert_eq!(response.content_type(), Some("application/json"));
        assert_eq!(response.text(), r#"{"flights":[]}"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_error_status_is_not_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/missing");
                then.status(404).body("nope");
            })
            .await;

        let client = client_for(&server);
        let url = ::url::Url::parse(&server.url("/missing")).unwrap();
        let response = client.fetch(&Request::get(url)).await.unwrap();

        assert_eq!(response.status, 404);
        assert!(!response.is_cacheable());
    }

    #[tokio::test]
    async fn test_fetch_other_origin_is_cors() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/tile.png");
                then.status(200).body("png");
            })
            .await;

        let other = ::url::Url::parse("https://trip.example").unwrap();
        let client = FetchClient::new(FetchConfig { origin: Some(other), ..Default::default() }).unwrap();
        let url = ::url::Url::parse(&server.url("/tile.png")).unwrap();
        let response = client.fetch(&Request::get(url)).await.unwrap();

        assert_eq!(response.kind, ResponseKind::Cors);
        assert!(!response.is_cacheable());
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_network_failure() {
        let client = FetchClient::new(FetchConfig::default()).unwrap();
        let url = ::url::Url::parse("http://127.0.0.1:9/").unwrap();
        let err = client.fetch(&Request::get(url)).await.unwrap_err();
        assert!(err.is_network_failure());
    }

    #[tokio::test]
    async fn test_fetch_forwards_request_headers() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/data/stays.json").header("accept", "application/json");
                then.status(200).body("[]");
            })
            .await;

        let client = client_for(&server);
        let url = ::url::Url::parse(&server.url("/data/stays.json")).unwrap();
        let request = Request::get(url).with_header("accept", "application/json");
        let response = client.fetch(&request).await.unwrap();

        assert_eq!(response.status, 200);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_large_body_is_returned_whole() {
        let server = MockServer::start_async().await;
        let audio = vec![7u8; 64 * 1024];
        server
            .mock_async(|when, then| {
                when.method(GET).path("/audio/fado.mp3");
                then.status(200).header("content-type", "audio/mpeg").body(audio.clone());
            })
            .await;

        let client = client_for(&server);
        let url = ::url::Url::parse(&server.url("/audio/fado.mp3")).unwrap();
        let response = client.fetch(&Request::get(url)).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body.len(), 64 * 1024);
        assert!(response.is_cacheable());
    }
}
