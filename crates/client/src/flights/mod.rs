//! Flight status client for the app's flights endpoint.
//!
//! ### API contract
//!
//! - **Endpoint**: `https://flight-info-api.p.rapidapi.com/status`
//! - **Authentication**: `X-RapidAPI-Key` and `X-RapidAPI-Host` headers.
//! - **Query**: `DepartureDateTime`, `CarrierCode`, `FlightNumber`, plus
//!   fixed `version=v2` and `CodeType=IATA`.
//! - **Normalization**: the first (most current) record is flattened into
//!   a [`Flight`]; an empty result is `NotFound`.

pub mod error;
pub mod request;
pub mod response;

pub use error::FlightError;
pub use request::FlightQuery;
pub use response::{Flight, FlightEndpoint, FlightStatusDetails, FlightsEnvelope};

use reqwest::header;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default base URL for the flight-info API.
const DEFAULT_BASE_URL: &str = "https://flight-info-api.p.rapidapi.com";

/// RapidAPI host header value.
const RAPIDAPI_HOST: &str = "flight-info-api.p.rapidapi.com";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "lisboa-sw/0.1";

/// Flight client configuration.
#[derive(Debug, Clone)]
pub struct FlightConfig {
    /// RapidAPI key.
    pub api_key: String,
    /// Base URL (default: https://flight-info-api.p.rapidapi.com).
    pub base_url: String,
    /// Request timeout (default: 10s).
    pub timeout: Duration,
    /// User-agent string (default: lisboa-sw/0.x).
    pub user_agent: String,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FlightConfig {
    /// Build from the application configuration.
    pub fn from_app_config(config: &lisboa_core::AppConfig) -> Result<Self, FlightError> {
        let api_key = config
            .require_rapidapi_key()
            .map_err(|_| FlightError::MissingApiKey)?;

        Ok(Self {
            api_key: api_key.to_string(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
            ..Default::default()
        })
    }
}

/// Flight-info API client.
#[derive(Debug, Clone)]
pub struct FlightClient {
    http: reqwest::Client,
    config: FlightConfig,
}

impl FlightClient {
    /// Create a new flight client with the given configuration.
    pub fn new(config: FlightConfig) -> Result<Self, FlightError> {
        if config.api_key.trim().is_empty() {
            return Err(FlightError::MissingApiKey);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FlightError::Network(Arc::new(e)))?;

        Ok(Self { http, config })
    }

    /// Look up the current status of one flight.
    pub async fn status(&self, query: &FlightQuery) -> Result<Flight, FlightError> {
        query.validate()?;

        let start = Instant::now();
        let url = format!("{}/status", self.config.base_url);

        tracing::debug!("fetching flight status: {}", query.flight_id());

        let http_response = self
            .http
            .get(&url)
            .header("X-RapidAPI-Key", &self.config.api_key)
            .header("X-RapidAPI-Host", RAPIDAPI_HOST)
            .header(header::ACCEPT, "application/json")
            .header(header::USER_AGENT, &self.config.user_agent)
            .query(query)
            .query(&[("version", "v2"), ("CodeType", "IATA")])
            .send()
            .await?;

        let status = http_response.status();
        tracing::debug!("flight-info API response status: {}", status);

        if status == 401 || status == 403 {
            return Err(FlightError::AuthError);
        }

        if status == 429 {
            return Err(FlightError::RateLimited);
        }

        if status.is_client_error() || status.is_server_error() {
            return Err(FlightError::HttpError { status: status.as_u16() });
        }

        let bytes = http_response.bytes().await?;
        let api_response: response::FlightInfoResponse =
            serde_json::from_slice(&bytes).map_err(|e| FlightError::Parse(e.to_string()))?;

        let raw = api_response.data.into_iter().flatten().next().ok_or(FlightError::NotFound)?;
        let flight = Flight::from_raw(query, raw);

        tracing::debug!("flight {} resolved in {:?}: {}", flight.id, start.elapsed(), flight.status);

        Ok(flight)
    }
}
