use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::services::booking::{self, BookingOverview, BookingReceipt, PassengerInfo};
use crate::utils::jwt::Claims;
use crate::handlers::ApiJson;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub flight_id: i32,
    pub seat_id: i32,
    #[serde(default)]
    pub passenger_name: String,
    #[serde(default)]
    pub passenger_email: String,
    pub passenger_phone: Option<String>,
}

/// Reserve a seat
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(payload): ApiJson<CreateBookingRequest>,
) -> AppResult<(StatusCode, Json<BookingReceipt>)> {
    let passenger = PassengerInfo {
        name: payload.passenger_name,
        email: payload.passenger_email,
        phone: payload.passenger_phone,
    };

    let receipt = booking::create_booking(
        &state.db,
        claims.sub,
        payload.flight_id,
        payload.seat_id,
        passenger,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(receipt)))
}

/// Cancel a booking and release its seat
pub async fn cancel_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<i32>,
) -> AppResult<Json<Value>> {
    booking::cancel_booking(&state.db, claims.sub, booking_id).await?;
    Ok(Json(json!({ "message": "Booking cancelled successfully" })))
}

/// List the caller's bookings
pub async fn my_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<BookingOverview>>> {
    let bookings = booking::list_bookings(&state.db, claims.sub).await?;
    Ok(Json(bookings))
}
