use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::error::AppResult;
use crate::services::flights::{self, FlightDetail, FlightSearch, FlightSearchParams, FlightSummary};
use crate::AppState;

/// Search flights by city pair
pub async fn search_flights(
    State(state): State<AppState>,
    Query(params): Query<FlightSearchParams>,
) -> AppResult<Json<Vec<FlightSummary>>> {
    let search = FlightSearch::try_from(params)?;
    let results = flights::search_flights(&state.db, &search).await?;
    Ok(Json(results))
}

/// Get a flight with its seat map
pub async fn get_flight(
    State(state): State<AppState>,
    Path(flight_id): Path<i32>,
) -> AppResult<Json<FlightDetail>> {
    let detail = flights::flight_detail(&state.db, flight_id).await?;
    Ok(Json(detail))
}
