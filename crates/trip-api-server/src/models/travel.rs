use serde::{Deserialize, Serialize};

// ===== REQUEST MODELS =====

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    /// Data URLs or public URLs of inspiration images
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub palette: String,
    #[serde(default)]
    pub album_mood: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRequest {
    pub place_code: String,
    pub start_date: String,
    pub end_date: String,
}

// ===== RESPONSE MODELS =====

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub destination: String,
    /// IATA code of the airport serving the destination
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_code: Option<String>,
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Activity {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Local start time, `YYYY-MM-DDTHH:mm:ss`
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ActivityList {
    pub activities: Vec<Activity>,
}
