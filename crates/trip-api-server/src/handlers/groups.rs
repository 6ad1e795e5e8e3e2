use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::flight::RoundTripQuote;
use crate::models::group::{
    ActivitySelection, GroupRecord, GroupSummary, JoinGroupRequest, PreferenceOutcome,
    PreferenceSubmission, TripCostParams,
};
use crate::models::travel::ActivityList;
use crate::state::AppState;
use crate::utils::ApiError;

pub async fn list_user_groups_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<GroupSummary>>, ApiError> {
    let groups = state.groups.list_user_groups(user_id).await?;
    Ok(Json(groups))
}

pub async fn join_group_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<JoinGroupRequest>,
) -> Result<Json<GroupRecord>, ApiError> {
    let group = state.groups.join_group(request).await?;
    Ok(Json(group))
}

pub async fn submit_preferences_handler(
    State(state): State<Arc<AppState>>,
    Path(group_id): Path<Uuid>,
    Json(submission): Json<PreferenceSubmission>,
) -> Result<Json<PreferenceOutcome>, ApiError> {
    let outcome = state.groups.submit_preferences(group_id, submission).await?;
    Ok(Json(outcome))
}

pub async fn suggest_activities_handler(
    State(state): State<Arc<AppState>>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<ActivityList>, ApiError> {
    let activities = state.groups.suggest_activities(group_id).await?;
    Ok(Json(ActivityList { activities }))
}

pub async fn list_activities_handler(
    State(state): State<Arc<AppState>>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<ActivityList>, ApiError> {
    let activities = state.groups.list_activities(group_id).await?;
    Ok(Json(ActivityList { activities }))
}

pub async fn save_activities_handler(
    State(state): State<Arc<AppState>>,
    Path(group_id): Path<Uuid>,
    Json(selection): Json<ActivitySelection>,
) -> Result<Json<ActivityList>, ApiError> {
    let activities = state
        .groups
        .save_activities(group_id, selection.activities)
        .await?;
    Ok(Json(ActivityList { activities }))
}

pub async fn trip_cost_handler(
    State(state): State<Arc<AppState>>,
    Path(group_id): Path<Uuid>,
    Query(params): Query<TripCostParams>,
) -> Result<Json<RoundTripQuote>, ApiError> {
    let quote = state.groups.trip_cost(group_id, &params.origin).await?;
    Ok(Json(quote))
}
