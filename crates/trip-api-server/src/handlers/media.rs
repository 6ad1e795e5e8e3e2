use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;
use std::sync::Arc;

use crate::models::media::{ImageSearchParams, Playlist, SongSearchParams, StockMediaKind};
use crate::state::AppState;
use crate::utils::ApiError;

pub async fn itunes_search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SongSearchParams>,
) -> Result<Json<Value>, ApiError> {
    let results = state.itunes.search_songs(params.q.as_deref()).await?;
    Ok(Json(results))
}

pub async fn pexels_search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ImageSearchParams>,
) -> Result<Json<Value>, ApiError> {
    let kind = StockMediaKind::parse(params.media_type.as_deref());
    let results = state
        .pexels
        .search(params.query.as_deref(), kind, params.per_page)
        .await?;
    Ok(Json(results))
}

pub async fn spotify_playlist_handler(
    State(state): State<Arc<AppState>>,
    Path(playlist_id): Path<String>,
) -> Result<Json<Playlist>, ApiError> {
    let playlist = state.spotify.playlist(&playlist_id).await?;
    Ok(Json(playlist))
}
