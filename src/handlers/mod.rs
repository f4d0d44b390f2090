pub mod auth;
pub mod bookings;
pub mod flights;
pub mod payments;

use axum::{extract::FromRequest, Json};
use serde_json::{json, Value};

use crate::error::AppError;

/// JSON request body whose rejections are reported as `{"error": ...}` 400s.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
