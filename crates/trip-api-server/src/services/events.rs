use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::PredictHqConfig;
use crate::models::travel::{Activity, ActivityRequest};
use crate::services::openai::TravelAdvisor;
use crate::utils::ApiError;

#[derive(Debug, Deserialize)]
struct EventSearchResponse {
    #[serde(default)]
    results: Vec<EventObject>,
}

#[derive(Debug, Deserialize)]
struct EventObject {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

impl From<EventObject> for Activity {
    fn from(event: EventObject) -> Self {
        Activity {
            title: event.title,
            description: event.description.unwrap_or_default(),
            start: event.start.unwrap_or_default(),
            category: event.category.unwrap_or_default(),
        }
    }
}

/// Drops a trailing `+hh:mm` offset; the event API wants local wall time
fn strip_offset(timestamp: &str) -> &str {
    timestamp.split('+').next().unwrap_or(timestamp)
}

/// Local events for a trip window, topped up with generated suggestions
#[derive(Clone)]
pub struct EventsService {
    client: Client,
    config: PredictHqConfig,
    advisor: Arc<dyn TravelAdvisor>,
}

impl EventsService {
    pub fn new(client: Client, config: PredictHqConfig, advisor: Arc<dyn TravelAdvisor>) -> Self {
        Self { client, config, advisor }
    }

    async fn search_events(&self, request: &ActivityRequest) -> Result<Vec<Activity>, ApiError> {
        let response = self
            .client
            .get(format!("{}/v1/events/", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .query(&[
                ("place.exact", request.place_code.as_str()),
                ("start.gte", strip_offset(&request.start_date)),
                ("start.lte", strip_offset(&request.end_date)),
                ("category", self.config.categories.as_str()),
                ("sort", "start"),
            ])
            .send()
            .await
            .map_err(|e| ApiError::UpstreamError(format!("Event search failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::UpstreamError(format!("Event search error: {} - {}", status, body)));
        }

        let events: EventSearchResponse = response
            .json()
            .await
            .map_err(|e| ApiError::UpstreamError(format!("Failed to parse events: {}", e)))?;

        Ok(events.results.into_iter().map(Activity::from).collect())
    }

    /// Events first, generated activities appended when events are scarce.
    ///
    /// Either source failing degrades to whatever the other produced.
    pub async fn activities(&self, request: &ActivityRequest) -> Vec<Activity> {
        let mut activities = match self.search_events(request).await {
            Ok(events) => events,
            Err(e) => {
                warn!("Event search for {} failed: {}", request.place_code, e);
                Vec::new()
            }
        };

        if activities.len() < self.config.min_results {
            match self.advisor.suggest_activities(request).await {
                Ok(generated) => activities.extend(generated),
                Err(e) => warn!("Generated activities for {} failed: {}", request.place_code, e),
            }
        }

        activities.truncate(self.config.max_results);
        info!("{} activities for {}", activities.len(), request.place_code);
        activities
    }
}
