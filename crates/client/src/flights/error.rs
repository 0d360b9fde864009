//! Flight status client error types.

use std::sync::Arc;

/// Flight lookup failures.
///
/// Upstream and transport errors keep their cause so the caller can decide
/// whether the app should fall back to the bundled `/data/flights.json`.
#[derive(Debug, thiserror::Error)]
pub enum FlightError {
    #[error("FLIGHT_CONFIG: LISBOA_SW_RAPIDAPI_KEY is not set")]
    MissingApiKey,

    /// Lists the blank parameters.
    #[error("FLIGHT_QUERY: missing {0}")]
    InvalidQuery(String),

    /// 401 or 403 from the API.
    #[error("FLIGHT_AUTH: the flight-info API rejected the key")]
    AuthError,

    #[error("FLIGHT_RATE_LIMITED: flight-info API quota exhausted")]
    RateLimited,

    #[error("FLIGHT_UPSTREAM: flight-info API answered HTTP {status}")]
    HttpError { status: u16 },

    /// Empty `data` array.
    #[error("FLIGHT_NOT_FOUND: no such flight on that date")]
    NotFound,

    #[error("FLIGHT_TIMEOUT: flight-info API did not answer in time")]
    Timeout,

    #[error("FLIGHT_NETWORK: {0}")]
    Network(Arc<reqwest::Error>),

    #[error("FLIGHT_PARSE: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for FlightError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { FlightError::Timeout } else { FlightError::Network(Arc::new(err)) }
    }
}
