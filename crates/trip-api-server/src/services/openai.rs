use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::OpenAiConfig;
use crate::models::travel::{Activity, ActivityList, ActivityRequest, Recommendation, RecommendationRequest};
use crate::utils::llm_json::parse_llm_json;
use crate::utils::{ApiError, Limiters};

pub const ACTIVITY_CATEGORIES: &str =
    "sports, conferences, expos, concerts, festivals, performing-arts, community, academic";

/// Produces destination and activity suggestions from mood inputs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TravelAdvisor: Send + Sync {
    async fn recommend(&self, request: &RecommendationRequest) -> Result<Recommendation, ApiError>;

    async fn suggest_activities(&self, request: &ActivityRequest) -> Result<Vec<Activity>, ApiError>;
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

fn recommendation_prompt(request: &RecommendationRequest) -> String {
    format!(
        r#"Based on the inspiration images, that depict real places, and a vibe that the user is trying to achieve, color palette mood ({palette}), and music mood ({mood}), recommend a travel destination and activities.

Please provide:
1. A recommended travel destination that matches these vibes
2. The IATA code of the main airport serving that destination
3. 3-5 specific activities or experiences that would be perfect for this destination
4. A brief explanation of why this destination matches the provided mood and inspiration

VERY IMPORTANT: Format the response as JSON with the following structure:
{{
  "destination": "string",
  "placeCode": "string",
  "activities": ["string"],
  "explanation": "string"
}}"#,
        palette = request.palette,
        mood = request.album_mood,
    )
}

fn activities_prompt(request: &ActivityRequest) -> String {
    format!(
        r#"Given the following travel destination and dates, suggest 5 unique activities or events that would be interesting for tourists:

Destination: {place}
Start Date: {start}
End Date: {end}

Please provide the response in the following JSON format:
{{
  "activities": [
    {{
      "title": "string",
      "description": "string",
      "start": "YYYY-MM-DDTHH:mm:ss",
      "category": "string"
    }}
  ]
}}

Make sure the activities are realistic and match the dates provided. The category should be one of: {categories}"#,
        place = request.place_code,
        start = request.start_date,
        end = request.end_date,
        categories = ACTIVITY_CATEGORIES,
    )
}

#[derive(Clone)]
pub struct OpenAiService {
    client: Client,
    config: OpenAiConfig,
    limiters: Arc<Limiters>,
}

impl OpenAiService {
    pub fn new(config: OpenAiConfig, limiters: Arc<Limiters>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ApiError::InternalError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config, limiters })
    }

    /// Single-turn chat completion, returning the reply text
    async fn complete(&self, content: Vec<ContentPart>) -> Result<String, ApiError> {
        let (_permit, waited) = Limiters::acquire_timed(
            self.limiters.llm.clone(),
            self.limiters.acquire_timeout,
            "openai_chat",
        )
        .await?;

        debug!("OpenAI slot acquired after {:?}", waited);

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage { role: "user", content }],
            max_tokens: self.config.max_tokens,
            temperature: 0.7,
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::LlmError(format!("Failed to call OpenAI API: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::LlmError(format!("OpenAI API error: {} - {}", status, body)));
        }

        let chat_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ApiError::LlmError(format!("Failed to parse OpenAI response: {}", e)))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| ApiError::LlmError("No content received from OpenAI".to_string()))
    }
}

#[async_trait]
impl TravelAdvisor for OpenAiService {
    async fn recommend(&self, request: &RecommendationRequest) -> Result<Recommendation, ApiError> {
        info!("Generating travel recommendation from {} images", request.images.len());

        let mut content = vec![ContentPart::Text { text: recommendation_prompt(request) }];
        content.extend(request.images.iter().map(|image| ContentPart::ImageUrl {
            image_url: ImageUrl { url: image.clone() },
        }));

        let reply = self.complete(content).await?;
        let mut recommendation: Recommendation = parse_llm_json(&reply)?;
        recommendation.place_code = recommendation
            .place_code
            .map(|code| code.trim().to_ascii_uppercase())
            .filter(|code| !code.is_empty());

        Ok(recommendation)
    }

    async fn suggest_activities(&self, request: &ActivityRequest) -> Result<Vec<Activity>, ApiError> {
        info!("Generating activities for {}", request.place_code);

        let reply = self
            .complete(vec![ContentPart::Text { text: activities_prompt(request) }])
            .await?;
        let list: ActivityList = parse_llm_json(&reply)?;
        Ok(list.activities)
    }
}
