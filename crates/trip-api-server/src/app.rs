use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::handlers;
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    // Probes
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/ready", get(handlers::health::readiness_check));

    let vendor_routes = Router::new()
        .route("/api/itunes", get(handlers::media::itunes_search_handler))
        .route("/api/pexels", get(handlers::media::pexels_search_handler))
        .route(
            "/api/spotify/playlist/{id}",
            get(handlers::media::spotify_playlist_handler),
        )
        .route("/api/skyscanner", post(handlers::flights::cheapest_flight_handler))
        .route("/api/skyscanner/trip", post(handlers::flights::round_trip_handler))
        .route(
            "/api/travel/recommendations",
            post(handlers::travel::recommendations_handler),
        )
        .route(
            "/api/travel/chatgpt-activities",
            post(handlers::travel::generated_activities_handler),
        )
        .route("/api/travel/activities", post(handlers::travel::activities_handler));

    let group_routes = Router::new()
        .route(
            "/api/users/{user_id}/groups",
            get(handlers::groups::list_user_groups_handler),
        )
        .route("/api/groups/join", post(handlers::groups::join_group_handler))
        .route(
            "/api/groups/{group_id}/preferences",
            post(handlers::groups::submit_preferences_handler),
        )
        .route(
            "/api/groups/{group_id}/activities/suggest",
            post(handlers::groups::suggest_activities_handler),
        )
        .route(
            "/api/groups/{group_id}/activities",
            get(handlers::groups::list_activities_handler)
                .put(handlers::groups::save_activities_handler),
        )
        .route(
            "/api/groups/{group_id}/trip-cost",
            get(handlers::groups::trip_cost_handler),
        );

    Router::new()
        .merge(public_routes)
        .merge(vendor_routes)
        .merge(group_routes)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
