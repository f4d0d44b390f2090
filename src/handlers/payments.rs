use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::services::payment::record_payment;
use crate::utils::jwt::Claims;
use crate::handlers::ApiJson;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub booking_id: i32,
    #[serde(default)]
    pub payment_method: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub message: String,
    pub transaction_id: String,
    pub email_sent: bool,
}

/// Pay for a booking, then mail the confirmation.
///
/// The payment is committed before the email is attempted; a failed email only
/// changes the message.
pub async fn create_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(payload): ApiJson<PaymentRequest>,
) -> AppResult<Json<PaymentResponse>> {
    let confirmation = record_payment(
        &state.db,
        claims.sub,
        payload.booking_id,
        &payload.payment_method,
    )
    .await?;

    let delivery = state.notifier.send_confirmation(&confirmation).await;

    Ok(Json(PaymentResponse {
        message: delivery.message().to_string(),
        transaction_id: confirmation.payment.transaction_id,
        email_sent: delivery.is_sent(),
    }))
}
