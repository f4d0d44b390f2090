use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    prelude::DateTimeWithTimeZone, sea_query::Expr, ActiveModelTrait, ColumnTrait,
    DatabaseConnection, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};
use serde::Serialize;

use crate::entities::booking::{self, BookingStatus};
use crate::entities::{flight, payment, seat};
use crate::entities::payment::PaymentStatus;
use crate::db::{is_unique_violation, retry_on_contention};
use crate::error::{AppError, AppResult};
use crate::utils::fare::seat_price;
use crate::utils::reference::booking_reference;

#[derive(Debug, Clone)]
pub struct PassengerInfo {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl PassengerInfo {
    fn validate(self) -> AppResult<Self> {
        let name = self.name.trim().to_string();
        let email = self.email.trim().to_string();
        if name.is_empty() || email.is_empty() {
            return Err(AppError::BadRequest(
                "Passenger name and email are required".to_string(),
            ));
        }

        Ok(Self {
            name,
            email,
            phone: self
                .phone
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingReceipt {
    pub booking_id: i32,
    pub booking_reference: String,
    pub total_amount: f64,
}

/// A booking joined with its flight, seat and payment, as listed to its owner.
#[derive(Debug, Serialize)]
pub struct BookingOverview {
    #[serde(flatten)]
    pub booking: booking::Model,
    pub flight_number: String,
    pub airline: String,
    pub departure_city: String,
    pub arrival_city: String,
    pub departure_time: DateTimeWithTimeZone,
    pub arrival_time: DateTimeWithTimeZone,
    pub seat_number: String,
    pub class: String,
    pub payment_status: Option<PaymentStatus>,
    pub transaction_id: Option<String>,
}

/// Reserve `seat_id` on `flight_id` for `user_id`.
///
/// The seat is re-read under a row lock inside the transaction, so a seat that
/// looked free earlier but was taken since fails with `SeatUnavailable`. Either
/// the booking row, the seat flag and the flight counter all change, or none do.
pub async fn create_booking(
    db: &DatabaseConnection,
    user_id: i32,
    flight_id: i32,
    seat_id: i32,
    passenger: PassengerInfo,
) -> AppResult<BookingReceipt> {
    create_booking_with(db, user_id, flight_id, seat_id, passenger, booking_reference).await
}

async fn create_booking_with<R>(
    db: &DatabaseConnection,
    user_id: i32,
    flight_id: i32,
    seat_id: i32,
    passenger: PassengerInfo,
    mut next_reference: R,
) -> AppResult<BookingReceipt>
where
    R: FnMut() -> String,
{
    let passenger = passenger.validate()?;

    // A taken reference is retried once with a fresh one
    let mut collided = false;
    loop {
        let reference = next_reference();
        let result = retry_on_contention(|| {
            book_seat(db, user_id, flight_id, seat_id, passenger.clone(), reference.clone())
        })
        .await;

        match result {
            Err(AppError::Database(e)) if is_unique_violation(&e) && !collided => {
                tracing::warn!(reference = %reference, "Booking reference already taken, retrying");
                collided = true;
            }
            other => return other,
        }
    }
}

async fn book_seat(
    db: &DatabaseConnection,
    user_id: i32,
    flight_id: i32,
    seat_id: i32,
    passenger: PassengerInfo,
    reference: String,
) -> AppResult<BookingReceipt> {
    let txn = db.begin().await?;
    match reserve_seat(&txn, user_id, flight_id, seat_id, passenger, reference).await {
        Ok(receipt) => {
            txn.commit().await?;
            tracing::info!(
                user_id,
                flight_id,
                seat_id,
                booking_id = receipt.booking_id,
                reference = %receipt.booking_reference,
                "Booking confirmed"
            );
            Ok(receipt)
        }
        Err(err) => {
            rollback(txn).await;
            Err(err)
        }
    }
}

async fn reserve_seat(
    txn: &DatabaseTransaction,
    user_id: i32,
    flight_id: i32,
    seat_id: i32,
    passenger: PassengerInfo,
    reference: String,
) -> AppResult<BookingReceipt> {
    let seat = seat::Entity::find_by_id(seat_id)
        .lock_exclusive()
        .one(txn)
        .await?
        .filter(|s| s.is_available && s.flight_id == flight_id)
        .ok_or(AppError::SeatUnavailable)?;

    let flight = flight::Entity::find_by_id(flight_id)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Flight not found".to_string()))?;

    let total_amount = seat_price(flight.price, seat.price_multiplier);

    let claimed = seat::Entity::update_many()
        .col_expr(seat::Column::IsAvailable, Expr::value(false))
        .filter(seat::Column::Id.eq(seat.id))
        .filter(seat::Column::IsAvailable.eq(true))
        .exec(txn)
        .await?;
    if claimed.rows_affected != 1 {
        return Err(AppError::SeatUnavailable);
    }

    let booking = booking::ActiveModel {
        user_id: Set(user_id),
        flight_id: Set(flight.id),
        seat_id: Set(seat.id),
        booking_reference: Set(reference),
        total_amount: Set(total_amount),
        passenger_name: Set(passenger.name),
        passenger_email: Set(passenger.email),
        passenger_phone: Set(passenger.phone),
        status: Set(BookingStatus::Confirmed),
        booking_date: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    let counted = flight::Entity::update_many()
        .col_expr(
            flight::Column::AvailableSeats,
            Expr::col(flight::Column::AvailableSeats).sub(1),
        )
        .filter(flight::Column::Id.eq(flight.id))
        .filter(flight::Column::AvailableSeats.gt(0))
        .exec(txn)
        .await?;
    if counted.rows_affected != 1 {
        return Err(AppError::Internal(format!(
            "Seat counter for flight {} is out of sync",
            flight.id
        )));
    }

    Ok(BookingReceipt {
        booking_id: booking.id,
        booking_reference: booking.booking_reference,
        total_amount: booking.total_amount,
    })
}

/// Cancel one of the user's bookings, releasing its seat.
pub async fn cancel_booking(db: &DatabaseConnection, user_id: i32, booking_id: i32) -> AppResult<()> {
    retry_on_contention(|| cancel_transaction(db, user_id, booking_id)).await
}

async fn cancel_transaction(db: &DatabaseConnection, user_id: i32, booking_id: i32) -> AppResult<()> {
    let txn = db.begin().await?;
    match release_seat(&txn, user_id, booking_id).await {
        Ok(()) => {
            txn.commit().await?;
            tracing::info!(user_id, booking_id, "Booking cancelled");
            Ok(())
        }
        Err(err) => {
            rollback(txn).await;
            Err(err)
        }
    }
}

async fn release_seat(txn: &DatabaseTransaction, user_id: i32, booking_id: i32) -> AppResult<()> {
    let booking = booking::Entity::find_by_id(booking_id)
        .filter(booking::Column::UserId.eq(user_id))
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    if booking.status == BookingStatus::Cancelled {
        return Err(AppError::Conflict("Booking already cancelled".to_string()));
    }

    let seat_id = booking.seat_id;
    let flight_id = booking.flight_id;

    let mut active: booking::ActiveModel = booking.into();
    active.status = Set(BookingStatus::Cancelled);
    active.update(txn).await?;

    let released = seat::Entity::update_many()
        .col_expr(seat::Column::IsAvailable, Expr::value(true))
        .filter(seat::Column::Id.eq(seat_id))
        .filter(seat::Column::IsAvailable.eq(false))
        .exec(txn)
        .await?;
    if released.rows_affected != 1 {
        return Err(AppError::Internal(format!(
            "Seat {} of booking {} was not reserved",
            seat_id, booking_id
        )));
    }

    let counted = flight::Entity::update_many()
        .col_expr(
            flight::Column::AvailableSeats,
            Expr::col(flight::Column::AvailableSeats).add(1),
        )
        .filter(flight::Column::Id.eq(flight_id))
        .filter(
            Expr::col(flight::Column::AvailableSeats).lt(Expr::col(flight::Column::TotalSeats)),
        )
        .exec(txn)
        .await?;
    if counted.rows_affected != 1 {
        return Err(AppError::Internal(format!(
            "Seat counter for flight {} is out of sync",
            flight_id
        )));
    }

    Ok(())
}

/// Dropping a transaction also rolls it back; doing it here lets us log failures.
pub(crate) async fn rollback(txn: DatabaseTransaction) {
    if let Err(e) = txn.rollback().await {
        tracing::error!(error = %e, "Failed to roll back transaction");
    }
}

/// All of a user's bookings, newest first.
pub async fn list_bookings(db: &DatabaseConnection, user_id: i32) -> AppResult<Vec<BookingOverview>> {
    let bookings = booking::Entity::find()
        .filter(booking::Column::UserId.eq(user_id))
        .order_by_desc(booking::Column::BookingDate)
        .order_by_desc(booking::Column::Id)
        .all(db)
        .await?;

    if bookings.is_empty() {
        return Ok(Vec::new());
    }

    let flight_ids: Vec<i32> = bookings.iter().map(|b| b.flight_id).collect();
    let seat_ids: Vec<i32> = bookings.iter().map(|b| b.seat_id).collect();
    let booking_ids: Vec<i32> = bookings.iter().map(|b| b.id).collect();

    let flights: HashMap<i32, flight::Model> = flight::Entity::find()
        .filter(flight::Column::Id.is_in(flight_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|f| (f.id, f))
        .collect();
    let seats: HashMap<i32, seat::Model> = seat::Entity::find()
        .filter(seat::Column::Id.is_in(seat_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();
    let payments: HashMap<i32, payment::Model> = payment::Entity::find()
        .filter(payment::Column::BookingId.is_in(booking_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|p| (p.booking_id, p))
        .collect();

    let overviews = bookings
        .into_iter()
        .filter_map(|b| {
            // Foreign keys guarantee both exist
            let flight = flights.get(&b.flight_id)?;
            let seat = seats.get(&b.seat_id)?;
            let payment = payments.get(&b.id);

            Some(BookingOverview {
                flight_number: flight.flight_number.clone(),
                airline: flight.airline.clone(),
                departure_city: flight.departure_city.clone(),
                arrival_city: flight.arrival_city.clone(),
                departure_time: flight.departure_time,
                arrival_time: flight.arrival_time,
                seat_number: seat.seat_number.clone(),
                class: seat.class.clone(),
                payment_status: payment.map(|p| p.payment_status),
                transaction_id: payment.map(|p| p.transaction_id.clone()),
                booking: b,
            })
        })
        .collect();

    Ok(overviews)
}
