use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};

use crate::entities::booking::{self, BookingStatus};
use crate::entities::payment::{self, PaymentStatus};
use crate::entities::flight;
use crate::db::retry_on_contention;
use crate::error::{AppError, AppResult};
use crate::services::booking::rollback;
use crate::utils::reference::transaction_id;

/// A committed payment together with the rows the confirmation is built from.
#[derive(Debug, Clone)]
pub struct PaymentConfirmation {
    pub payment: payment::Model,
    pub booking: booking::Model,
    pub flight: flight::Model,
}

/// Record a completed payment for one of the user's bookings.
///
/// The payment commits on its own; rendering and mailing the confirmation
/// happen afterwards and cannot undo it.
pub async fn record_payment(
    db: &DatabaseConnection,
    user_id: i32,
    booking_id: i32,
    method: &str,
) -> AppResult<PaymentConfirmation> {
    let method = method.trim();
    if method.is_empty() {
        return Err(AppError::BadRequest("Payment method is required".to_string()));
    }

    retry_on_contention(|| payment_transaction(db, user_id, booking_id, method)).await
}

async fn payment_transaction(
    db: &DatabaseConnection,
    user_id: i32,
    booking_id: i32,
    method: &str,
) -> AppResult<PaymentConfirmation> {
    let txn = db.begin().await?;
    match insert_payment(&txn, user_id, booking_id, method).await {
        Ok(confirmation) => {
            txn.commit().await?;
            tracing::info!(
                user_id,
                booking_id,
                transaction_id = %confirmation.payment.transaction_id,
                amount = confirmation.payment.amount,
                "Payment recorded"
            );
            Ok(confirmation)
        }
        Err(err) => {
            rollback(txn).await;
            Err(err)
        }
    }
}

async fn insert_payment(
    txn: &DatabaseTransaction,
    user_id: i32,
    booking_id: i32,
    method: &str,
) -> AppResult<PaymentConfirmation> {
    let booking = booking::Entity::find_by_id(booking_id)
        .filter(booking::Column::UserId.eq(user_id))
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    if booking.status == BookingStatus::Cancelled {
        return Err(AppError::BadRequest("Booking is cancelled".to_string()));
    }

    let already_paid = payment::Entity::find()
        .filter(payment::Column::BookingId.eq(booking.id))
        .count(txn)
        .await?;
    if already_paid > 0 {
        return Err(AppError::Conflict("Booking already paid".to_string()));
    }

    let flight = flight::Entity::find_by_id(booking.flight_id)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Flight not found".to_string()))?;

    let payment = payment::ActiveModel {
        booking_id: Set(booking.id),
        payment_method: Set(method.to_string()),
        payment_status: Set(PaymentStatus::Completed),
        transaction_id: Set(transaction_id()),
        amount: Set(booking.total_amount),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(txn)
    .await
    .map_err(|e| AppError::from_unique_violation(e, "Booking already paid"))?;

    Ok(PaymentConfirmation {
        payment,
        booking,
        flight,
    })
}
