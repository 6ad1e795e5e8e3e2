use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::info;

use crate::models::flight::{
    parse_travel_date, FlightQuery, FlightQuote, FlightSearchRequest, RoundTripQuote,
    RoundTripRequest,
};
use crate::state::AppState;
use crate::utils::ApiError;

pub async fn cheapest_flight_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FlightSearchRequest>,
) -> Result<Json<FlightQuote>, ApiError> {
    let query = FlightQuery::try_from(request)?;
    info!(
        "Flight price request {} -> {} on {}",
        query.origin, query.destination, query.date
    );

    let quote = state.flights.cheapest_price(&query).await?;
    Ok(Json(quote))
}

pub async fn round_trip_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RoundTripRequest>,
) -> Result<Json<RoundTripQuote>, ApiError> {
    let outbound = FlightQuery::new(
        &request.origin,
        &request.destination,
        parse_travel_date(&request.depart_date)?,
    )?;
    let return_date = parse_travel_date(&request.return_date)?;
    info!(
        "Round trip request {} <-> {} ({} to {})",
        outbound.origin, outbound.destination, outbound.date, return_date
    );

    let quote = state.flights.round_trip(&outbound, return_date).await?;
    Ok(Json(quote))
}
