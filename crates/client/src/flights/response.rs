//! Flight-info API response types and normalization.

use serde::{Deserialize, Serialize};

use super::request::FlightQuery;

/// Raw response from the flight-info `status` endpoint.
#[derive(Debug, Deserialize)]
pub struct FlightInfoResponse {
    #[serde(default)]
    pub data: Option<Vec<RawFlight>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFlight {
    #[serde(default)]
    pub carrier: Option<CodePair>,
    #[serde(default)]
    pub flight_number: Option<u32>,
    pub departure: RawEndpoint,
    pub arrival: RawEndpoint,
    /// Scheduled block time in minutes.
    #[serde(default)]
    pub elapsed_time: Option<u32>,
    #[serde(default)]
    pub status_details: Option<Vec<RawStatusDetail>>,
}

/// IATA/ICAO code pair used for carriers and airports.
#[derive(Debug, Deserialize)]
pub struct CodePair {
    #[serde(default)]
    pub iata: Option<String>,
    #[serde(default)]
    pub icao: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawEndpoint {
    #[serde(default)]
    pub airport: Option<CodePair>,
    #[serde(default)]
    pub terminal: Option<String>,
    pub date: LocalUtc,
    pub time: LocalUtc,
}

#[derive(Debug, Deserialize)]
pub struct LocalUtc {
    pub local: String,
    #[serde(default)]
    pub utc: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStatusDetail {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub departure: Option<RawStatusDeparture>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStatusDeparture {
    #[serde(default)]
    pub off_ground: Option<RawOffGround>,
}

#[derive(Debug, Deserialize)]
pub struct RawOffGround {
    #[serde(default)]
    pub utc: Option<String>,
}

/// Normalized flight segment, in the shape the app renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub id: String,
    pub airline: String,
    pub airline_code: String,
    pub departure: FlightEndpoint,
    pub arrival: FlightEndpoint,
    pub duration: String,
    pub status: String,
    pub status_details: FlightStatusDetails,
    #[serde(rename = "type")]
    pub segment_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlightEndpoint {
    pub airport: String,
    pub time: String,
    pub terminal: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightStatusDetails {
    pub last_updated: String,
    pub actual_departure: String,
}

/// Body of the flights endpoint: `{ "flights": [...] }`.
#[derive(Debug, Clone, Serialize)]
pub struct FlightsEnvelope {
    pub flights: Vec<Flight>,
}

const STATUS_UNKNOWN: &str = "Status Unknown";
const NOT_UPDATED: &str = "Not updated yet";

impl From<RawEndpoint> for FlightEndpoint {
    fn from(raw: RawEndpoint) -> Self {
        FlightEndpoint {
            airport: raw.airport.and_then(|a| a.iata).unwrap_or_default(),
            time: format!("{}T{}", raw.date.local, raw.time.local),
            terminal: raw.terminal.unwrap_or_default(),
        }
    }
}

/// Render a block time in minutes as "Xh Ym"; zero or absent is blank.
pub fn format_duration(minutes: Option<u32>) -> String {
    match minutes {
        Some(m) if m > 0 => format!("{}h {}m", m / 60, m % 60),
        _ => String::new(),
    }
}

impl Flight {
    /// Flatten one raw flight record.
    ///
    /// Identity comes from the query the caller made, not the payload, so
    /// the app can match the result to the segment it asked about.
    pub fn from_raw(query: &FlightQuery, raw: RawFlight) -> Self {
        let latest = raw.status_details.into_iter().flatten().next();

        let status = latest
            .as_ref()
            .and_then(|d| d.state.clone())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| STATUS_UNKNOWN.to_string());
        let last_updated = latest
            .as_ref()
            .and_then(|d| d.updated_at.clone())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| NOT_UPDATED.to_string());
        let actual_departure = latest
            .and_then(|d| d.departure)
            .and_then(|d| d.off_ground)
            .and_then(|o| o.utc)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| NOT_UPDATED.to_string());

        Flight {
            id: query.flight_id(),
            airline: query.carrier_code.clone(),
            airline_code: query.carrier_code.clone(),
            departure: raw.departure.into(),
            arrival: raw.arrival.into(),
            duration: format_duration(raw.elapsed_time),
            status,
            status_details: FlightStatusDetails { last_updated, actual_departure },
            segment_type: "outbound".to_string(),
        }
    }
}
