use async_trait::async_trait;
use chrono::Datelike;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::pricing::SearchResponse;
use super::FlightSearchApi;
use crate::config::SkyscannerConfig;
use crate::models::flight::FlightQuery;
use crate::utils::ApiError;

const CREATE_PATH: &str = "/apiservices/v3/flights/live/search/create";
const POLL_PATH: &str = "/apiservices/v3/flights/live/search/poll";

#[derive(Debug, Serialize)]
struct CreateSearchRequest<'a> {
    query: SearchQuery<'a>,
}

#[derive(Debug, Serialize)]
struct SearchQuery<'a> {
    market: &'a str,
    locale: &'a str,
    currency: &'a str,
    query_legs: Vec<QueryLeg>,
    adults: u32,
    cabin_class: &'a str,
}

#[derive(Debug, Serialize)]
struct QueryLeg {
    origin_place_id: PlaceId,
    destination_place_id: PlaceId,
    date: LegDate,
}

#[derive(Debug, Serialize)]
struct PlaceId {
    iata: String,
}

#[derive(Debug, Serialize)]
struct LegDate {
    year: i32,
    month: u32,
    day: u32,
}

/// Live flight search client for the Skyscanner partner API
#[derive(Clone)]
pub struct SkyscannerClient {
    client: Client,
    config: SkyscannerConfig,
}

impl SkyscannerClient {
    pub fn new(config: SkyscannerConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ApiError::InternalError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn build_request<'a>(&'a self, query: &FlightQuery) -> CreateSearchRequest<'a> {
        CreateSearchRequest {
            query: SearchQuery {
                market: &self.config.market,
                locale: &self.config.locale,
                currency: &self.config.currency,
                query_legs: vec![QueryLeg {
                    origin_place_id: PlaceId { iata: query.origin.clone() },
                    destination_place_id: PlaceId { iata: query.destination.clone() },
                    date: LegDate {
                        year: query.date.year(),
                        month: query.date.month(),
                        day: query.date.day(),
                    },
                }],
                adults: self.config.adults,
                cabin_class: &self.config.cabin_class,
            },
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder, op: &str) -> Result<SearchResponse, ApiError> {
        let response = request
            .header("x-api-key", &self.config.api_key)
            .send()
            .await
            .map_err(|e| ApiError::UpstreamError(format!("Flight {} failed: {}", op, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::UpstreamError(format!(
                "Flight {} error: {} - {}",
                op, status, body
            )));
        }

        response
            .json::<SearchResponse>()
            .await
            .map_err(|e| ApiError::UpstreamError(format!("Failed to parse flight {} response: {}", op, e)))
    }
}

#[async_trait]
impl FlightSearchApi for SkyscannerClient {
    async fn create_session(&self, query: &FlightQuery) -> Result<String, ApiError> {
        debug!("Creating flight search {} -> {} on {}", query.origin, query.destination, query.date);

        let url = format!("{}{}", self.config.base_url, CREATE_PATH);
        let request = self.client.post(&url).json(&self.build_request(query));
        let created = self.send(request, "session create").await?;

        created
            .session_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::UpstreamError("Failed to create session: no session token".to_string()))
    }

    async fn poll_session(&self, session_token: &str) -> Result<SearchResponse, ApiError> {
        let url = format!("{}{}/{}", self.config.base_url, POLL_PATH, session_token);
        self.send(self.client.post(&url), "poll").await
    }

    fn currency(&self) -> String {
        self.config.currency.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: String) -> SkyscannerConfig {
        SkyscannerConfig {
            base_url,
            api_key: "test-key".to_string(),
            market: "UK".to_string(),
            locale: "en-GB".to_string(),
            currency: "GBP".to_string(),
            adults: 1,
            cabin_class: "CABIN_CLASS_ECONOMY".to_string(),
            poll_max_attempts: 3,
            poll_interval_ms: 1,
            timeout_seconds: 5,
        }
    }

    fn query() -> FlightQuery {
        FlightQuery::new("BCN", "SZX", NaiveDate::from_ymd_opt(2025, 10, 30).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_create_session_sends_leg_and_key() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(CREATE_PATH))
            .and(header("x-api-key", "test-key"))
            .and(body_partial_json(json!({
                "query": {
                    "market": "UK",
                    "currency": "GBP",
                    "query_legs": [{
                        "origin_place_id": { "iata": "BCN" },
                        "destination_place_id": { "iata": "SZX" },
                        "date": { "year": 2025, "month": 10, "day": 30 }
                    }]
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sessionToken": "tok-1" })))
            .expect(1)
            .mount(&server)
            .await;

        let client = SkyscannerClient::new(config(server.uri())).unwrap();
        assert_eq!(client.create_session(&query()).await.unwrap(), "tok-1");
    }

    #[tokio::test]
    async fn test_missing_token_is_upstream_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(CREATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "RESULT_STATUS_FAILED" })))
            .mount(&server)
            .await;

        let client = SkyscannerClient::new(config(server.uri())).unwrap();
        assert!(matches!(
            client.create_session(&query()).await,
            Err(ApiError::UpstreamError(_))
        ));
    }

    #[tokio::test]
    async fn test_poll_error_status_is_upstream_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("{}/tok-1", POLL_PATH)))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let client = SkyscannerClient::new(config(server.uri())).unwrap();
        let err = client.poll_session("tok-1").await.unwrap_err();
        assert!(matches!(err, ApiError::UpstreamError(msg) if msg.contains("429")));
    }
}
