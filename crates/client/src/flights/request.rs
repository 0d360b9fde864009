//! Flight status query parameters and validation.

use serde::Serialize;

/// One flight lookup, as the app's flights endpoint receives it.
///
/// Serializes to the query parameters of the flight-info `status` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlightQuery {
    /// IATA carrier code, e.g. "TP".
    #[serde(rename = "CarrierCode")]
    pub carrier_code: String,

    /// Flight number without the carrier prefix, e.g. "1351".
    #[serde(rename = "FlightNumber")]
    pub flight_number: String,

    /// Departure date or date-time as the API accepts it, e.g. "2025-05-02".
    #[serde(rename = "DepartureDateTime")]
    pub departure_date_time: String,
}

impl FlightQuery {
    /// Build a query, trimming surrounding whitespace from every value.
    pub fn new(carrier_code: &str, flight_number: &str, departure_date_time: &str) -> Self {
        Self {
            carrier_code: carrier_code.trim().to_string(),
            flight_number: flight_number.trim().to_string(),
            departure_date_time: departure_date_time.trim().to_string(),
        }
    }

    /// Validate the query.
    ///
    /// All three parameters are required.
    pub fn validate(&self) -> Result<(), crate::flights::FlightError> {
        let missing: Vec<&str> = [
            ("carrierCode", &self.carrier_code),
            ("flightNumber", &self.flight_number),
            ("departureDateTime", &self.departure_date_time),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(crate::flights::FlightError::InvalidQuery(missing.join(", ")))
        }
    }

    /// Flight identifier used by the app, e.g. "TP1351".
    pub fn flight_id(&self) -> String {
        format!("{}{}", self.carrier_code, self.flight_number)
    }
}
