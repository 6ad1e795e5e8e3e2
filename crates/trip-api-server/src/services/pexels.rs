use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::PexelsConfig;
use crate::models::media::StockMediaKind;
use crate::utils::ApiError;

/// Stock photo and video search for mood boards
#[derive(Clone)]
pub struct PexelsService {
    client: Client,
    config: PexelsConfig,
}

impl PexelsService {
    pub fn new(client: Client, config: PexelsConfig) -> Self {
        Self { client, config }
    }

    pub async fn search(
        &self,
        query: Option<&str>,
        kind: StockMediaKind,
        per_page: Option<u32>,
    ) -> Result<Value, ApiError> {
        let query = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| ApiError::BadRequest("Query parameter is required".to_string()))?;

        let endpoint = match kind {
            StockMediaKind::Video => "videos/search",
            StockMediaKind::Image => "v1/search",
        };
        let per_page = per_page.unwrap_or(self.config.default_per_page).to_string();

        debug!("Pexels {} search: {}", endpoint, query);

        let response = self
            .client
            .get(format!("{}/{}", self.config.base_url, endpoint))
            .header("Authorization", &self.config.api_key)
            .query(&[("query", query), ("per_page", per_page.as_str())])
            .send()
            .await
            .map_err(|e| ApiError::UpstreamError(format!("Failed to fetch from Pexels: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(ApiError::UpstreamError(format!("Failed to fetch from Pexels: {}", status)));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ApiError::UpstreamError(format!("Failed to parse Pexels response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service(base_url: String) -> PexelsService {
        PexelsService::new(
            Client::new(),
            PexelsConfig { base_url, api_key: "px-key".to_string(), default_per_page: 10 },
        )
    }

    #[tokio::test]
    async fn test_missing_query_is_bad_request() {
        let result = service("http://127.0.0.1:9".to_string())
            .search(None, StockMediaKind::Image, None)
            .await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_video_search_uses_video_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos/search"))
            .and(header("Authorization", "px-key"))
            .and(query_param("query", "beach"))
            .and(query_param("per_page", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "videos": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let result = service(server.uri())
            .search(Some("beach"), StockMediaKind::Video, None)
            .await
            .unwrap();
        assert_eq!(result, json!({ "videos": [] }));
    }

    #[tokio::test]
    async fn test_upstream_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let result = service(server.uri())
            .search(Some("alps"), StockMediaKind::Image, Some(5))
            .await;
        assert!(matches!(result, Err(ApiError::UpstreamError(_))));
    }
}
