use std::future::Future;
use std::time::Duration;

use rand::Rng;
use sea_orm::{sqlx, ConnectOptions, Database, DatabaseConnection, DbErr, RuntimeErr, SqlErr};

use crate::config::Config;
use crate::error::{AppError, AppResult};

pub mod seed;

/// Attempts per transaction before lock contention is reported as an error.
const MAX_LOCK_ATTEMPTS: u32 = 10;

// SQLITE_BUSY and SQLITE_LOCKED; extended codes keep these in the low byte
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

pub async fn connect(config: &Config) -> AppResult<DatabaseConnection> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    options
        .max_connections(config.db_max_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    Database::connect(options)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to connect to database: {}", e)))
}

/// True when SQLite refused the statement because another connection holds
/// the database lock. The whole transaction has to be retried.
pub fn is_lock_contention(err: &DbErr) -> bool {
    let source = match err {
        DbErr::Conn(RuntimeErr::SqlxError(e))
        | DbErr::Exec(RuntimeErr::SqlxError(e))
        | DbErr::Query(RuntimeErr::SqlxError(e)) => e,
        _ => return false,
    };

    match source {
        sqlx::Error::Database(db_err) => db_err
            .code()
            .and_then(|code| code.parse::<i32>().ok())
            .is_some_and(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED)),
        _ => false,
    }
}

pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Run a transactional operation, starting it over while SQLite reports lock
/// contention. `operation` must open its own transaction on every call.
pub async fn retry_on_contention<T, F, Fut>(mut operation: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Err(AppError::Database(e)) if is_lock_contention(&e) && attempt < MAX_LOCK_ATTEMPTS => {
                tracing::debug!(attempt, error = %e, "Database locked, retrying transaction");
                tokio::time::sleep(backoff(attempt)).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}

fn backoff(attempt: u32) -> Duration {
    let jitter = rand::thread_rng().gen_range(0..10u64);
    Duration::from_millis(10 * u64::from(attempt) + jitter)
}
