use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::info;

use crate::models::travel::{ActivityList, ActivityRequest, Recommendation, RecommendationRequest};
use crate::state::AppState;
use crate::utils::ApiError;

pub async fn recommendations_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RecommendationRequest>,
) -> Result<Json<Recommendation>, ApiError> {
    info!(
        "Recommendation request with {} images",
        request.images.len()
    );
    let recommendation = state.advisor.recommend(&request).await?;
    Ok(Json(recommendation))
}

pub async fn generated_activities_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ActivityRequest>,
) -> Result<Json<ActivityList>, ApiError> {
    let activities = state.advisor.suggest_activities(&request).await?;
    Ok(Json(ActivityList { activities }))
}

/// Local events, topped up with generated ideas when there are too few
pub async fn activities_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ActivityRequest>,
) -> Result<Json<ActivityList>, ApiError> {
    if request.place_code.trim().is_empty() {
        return Err(ApiError::BadRequest("placeCode is required".to_string()));
    }
    let activities = state.events.activities(&request).await;
    Ok(Json(ActivityList { activities }))
}
