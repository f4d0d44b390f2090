//! Database-facing operations. Handlers stay thin and call into these with the
//! pooled connection from `AppState`.

pub mod booking;
pub mod flights;
pub mod payment;
