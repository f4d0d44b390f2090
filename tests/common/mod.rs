//! Shared fixtures for the integration tests: an in-memory SQLite database
//! migrated from scratch, row builders, and scripted mailers.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;

use flight_booking_backend::config::Config;
use flight_booking_backend::entities::{flight, seat, user};
use flight_booking_backend::notify::mailer::{ConfirmationEmail, ConfirmationMailer};
use flight_booking_backend::notify::{Notifier, NotifyError};
use flight_booking_backend::services::booking::PassengerInfo;
use flight_booking_backend::utils::password::hash_password;
use flight_booking_backend::AppState;

pub const JWT_SECRET: &str = "test-secret";
pub const PASSWORD: &str = "secret123";

/// A single shared connection, so concurrent transactions queue on the pool
/// instead of tripping over SQLite's writer lock.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options).await.expect("connect sqlite");
    migration::Migrator::up(&db, None).await.expect("migrate");
    db
}

/// A file-backed database behind a real multi-connection pool, so concurrent
/// transactions overlap and contend for SQLite's lock.
pub async fn setup_file_db(dir: &Path, max_connections: u32) -> DatabaseConnection {
    let url = format!("sqlite://{}?mode=rwc", dir.join("bookings.db").display());
    let mut options = ConnectOptions::new(url);
    options
        .max_connections(max_connections)
        .sqlx_logging(false);

    let db = Database::connect(options).await.expect("connect sqlite file");
    migration::Migrator::up(&db, None).await.expect("migrate");
    db
}

pub async fn insert_user(db: &DatabaseConnection, username: &str) -> user::Model {
    user::ActiveModel {
        username: Set(username.to_string()),
        email: Set(format!("{}@example.com", username)),
        password_hash: Set(hash_password(PASSWORD).unwrap()),
        first_name: Set("Test".to_string()),
        last_name: Set("User".to_string()),
        phone: Set(None),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert user")
}

/// Insert a flight with one seat per `(seat_number, price_multiplier)`, all free.
pub async fn insert_flight(
    db: &DatabaseConnection,
    flight_number: &str,
    from: &str,
    to: &str,
    departs_in_hours: i64,
    price: f64,
    seats: &[(&str, f64)],
) -> (flight::Model, Vec<seat::Model>) {
    let departure = Utc::now() + chrono::Duration::hours(departs_in_hours);
    let flight = flight::ActiveModel {
        flight_number: Set(flight_number.to_string()),
        airline: Set("Test Air".to_string()),
        departure_city: Set(from.to_string()),
        arrival_city: Set(to.to_string()),
        departure_time: Set(departure.into()),
        arrival_time: Set((departure + chrono::Duration::hours(2)).into()),
        price: Set(price),
        total_seats: Set(seats.len() as i32),
        available_seats: Set(seats.len() as i32),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert flight");

    let mut rows = Vec::with_capacity(seats.len());
    for (number, multiplier) in seats {
        let seat = seat::ActiveModel {
            flight_id: Set(flight.id),
            seat_number: Set(number.to_string()),
            class: Set("economy".to_string()),
            is_available: Set(true),
            price_multiplier: Set(*multiplier),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("insert seat");
        rows.push(seat);
    }

    (flight, rows)
}

pub fn passenger() -> PassengerInfo {
    PassengerInfo {
        name: "Asha Rao".to_string(),
        email: "asha@example.com".to_string(),
        phone: Some("9999999999".to_string()),
    }
}

/// What a mailer saw when it was called.
#[derive(Debug, Clone)]
pub struct Delivered {
    pub email: ConfirmationEmail,
    pub attachment_existed: bool,
    pub attachment_is_pdf: bool,
}

#[derive(Clone, Default)]
pub struct RecordingMailer {
    pub delivered: Arc<Mutex<Vec<Delivered>>>,
}

#[async_trait]
impl ConfirmationMailer for RecordingMailer {
    async fn send_confirmation(&self, email: &ConfirmationEmail) -> Result<(), NotifyError> {
        let bytes = tokio::fs::read(&email.attachment).await.ok();
        self.delivered.lock().unwrap().push(Delivered {
            email: email.clone(),
            attachment_existed: bytes.is_some(),
            attachment_is_pdf: bytes.is_some_and(|b| b.starts_with(b"%PDF-")),
        });
        Ok(())
    }
}

pub struct FailingMailer;

#[async_trait]
impl ConfirmationMailer for FailingMailer {
    async fn send_confirmation(&self, _email: &ConfirmationEmail) -> Result<(), NotifyError> {
        Err(NotifyError::Mail("connection refused".to_string()))
    }
}

pub struct SlowMailer(pub Duration);

#[async_trait]
impl ConfirmationMailer for SlowMailer {
    async fn send_confirmation(&self, _email: &ConfirmationEmail) -> Result<(), NotifyError> {
        tokio::time::sleep(self.0).await;
        Ok(())
    }
}

pub fn notifier(mailer: Arc<dyn ConfirmationMailer>, dir: &Path, timeout: Duration) -> Notifier {
    Notifier::new(mailer, dir.to_path_buf(), timeout)
}

pub fn test_config(confirmation_dir: PathBuf) -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        db_max_connections: 1,
        jwt_secret: JWT_SECRET.to_string(),
        jwt_expiration_hours: 24,
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        request_timeout_secs: 30,
        smtp: None,
        email_timeout_secs: 5,
        confirmation_dir,
        seed_sample_data: false,
    }
}

pub async fn app_state(mailer: Arc<dyn ConfirmationMailer>, dir: &Path) -> AppState {
    let config = test_config(dir.to_path_buf());
    AppState {
        db: setup_db().await,
        notifier: notifier(mailer, dir, config.email_timeout()),
        config,
    }
}

/// Files left behind in the confirmation directory.
pub fn leftover_files(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .map(|entries| entries.filter_map(|e| e.ok()).map(|e| e.path()).collect())
        .unwrap_or_default()
}
