use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::utils::ApiError;

// ===== REQUEST MODELS =====

#[derive(Debug, Deserialize)]
pub struct FlightSearchRequest {
    pub origin: String,
    pub destination: String,
    /// `YYYY-MM-DD` or an ISO timestamp
    pub date: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundTripRequest {
    pub origin: String,
    pub destination: String,
    pub depart_date: String,
    pub return_date: String,
}

/// One validated leg: IATA origin, IATA destination, travel date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightQuery {
    pub origin: String,
    pub destination: String,
    pub date: NaiveDate,
}

impl FlightQuery {
    pub fn new(origin: &str, destination: &str, date: NaiveDate) -> Result<Self, ApiError> {
        Ok(Self {
            origin: parse_iata(origin)?,
            destination: parse_iata(destination)?,
            date,
        })
    }

    pub fn reversed(&self, date: NaiveDate) -> Self {
        Self {
            origin: self.destination.clone(),
            destination: self.origin.clone(),
            date,
        }
    }
}

impl TryFrom<FlightSearchRequest> for FlightQuery {
    type Error = ApiError;

    fn try_from(request: FlightSearchRequest) -> Result<Self, Self::Error> {
        FlightQuery::new(&request.origin, &request.destination, parse_travel_date(&request.date)?)
    }
}

fn parse_iata(code: &str) -> Result<String, ApiError> {
    let code = code.trim();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code.to_ascii_uppercase())
    } else {
        Err(ApiError::BadRequest(format!("'{}' is not an IATA airport code", code)))
    }
}

/// Accepts `2025-10-30` as well as `2025-10-30T00:00:00+02:00`
pub fn parse_travel_date(value: &str) -> Result<NaiveDate, ApiError> {
    let day = value.trim().split('T').next().unwrap_or_default();
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("Invalid travel date: {}", value)))
}

// ===== RESPONSE MODELS =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightQuote {
    pub price: f64,
    pub currency: String,
    pub itinerary_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundTripQuote {
    pub outbound: FlightQuote,
    pub inbound: FlightQuote,
    pub total: f64,
    pub currency: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_iso_dates() {
        let expected = NaiveDate::from_ymd_opt(2025, 10, 30).unwrap();
        assert_eq!(parse_travel_date("2025-10-30").unwrap(), expected);
        assert_eq!(parse_travel_date("2025-10-30T00:00:00+02:00").unwrap(), expected);
        assert!(parse_travel_date("30/10/2025").is_err());
    }

    #[test]
    fn test_iata_codes_are_normalized() {
        let query = FlightQuery::new("bcn", " SZX ", NaiveDate::from_ymd_opt(2025, 10, 30).unwrap())
            .unwrap();
        assert_eq!(query.origin, "BCN");
        assert_eq!(query.destination, "SZX");
    }

    #[test]
    fn test_rejects_city_names() {
        let date = NaiveDate::from_ymd_opt(2025, 10, 30).unwrap();
        assert!(matches!(
            FlightQuery::new("Maui, Hawaii", "OGG", date),
            Err(ApiError::BadRequest(_))
        ));
    }
}
