use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::ItunesConfig;
use crate::utils::ApiError;

/// Song lookup against the iTunes Search API
#[derive(Clone)]
pub struct ItunesService {
    client: Client,
    config: ItunesConfig,
}

impl ItunesService {
    pub fn new(client: Client, config: ItunesConfig) -> Self {
        Self { client, config }
    }

    /// Blank terms short-circuit to an empty result set
    pub async fn search_songs(&self, term: Option<&str>) -> Result<Value, ApiError> {
        let term = match term.map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => return Ok(json!({ "results": [] })),
        };

        debug!("iTunes search: {}", term);

        let limit = self.config.result_limit.to_string();
        let response = self
            .client
            .get(format!("{}/search", self.config.base_url))
            .query(&[("term", term), ("media", "music"), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(|e| ApiError::UpstreamError(format!("iTunes request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::UpstreamError(format!("iTunes API error: {} - {}", status, body)));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ApiError::UpstreamError(format!("Failed to parse iTunes response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service(base_url: String) -> ItunesService {
        ItunesService::new(Client::new(), ItunesConfig { base_url, result_limit: 3 })
    }

    #[tokio::test]
    async fn test_blank_term_skips_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).respond_with(ResponseTemplate::new(500)).expect(0).mount(&server).await;

        let result = service(server.uri()).search_songs(Some("   ")).await.unwrap();
        assert_eq!(result, json!({ "results": [] }));

        let result = service(server.uri()).search_songs(None).await.unwrap();
        assert_eq!(result, json!({ "results": [] }));
    }

    #[tokio::test]
    async fn test_search_passes_term_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("term", "bossa nova"))
            .and(query_param("media", "music"))
            .and(query_param("limit", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "resultCount": 1,
                "results": [ { "trackName": "Garota de Ipanema" } ]
            })))
            .mount(&server)
            .await;

        let result = service(server.uri()).search_songs(Some("bossa nova")).await.unwrap();
        assert_eq!(result["resultCount"], 1);
        assert_eq!(result["results"][0]["trackName"], "Garota de Ipanema");
    }
}
