pub mod booking;
pub mod flight;
pub mod payment;
pub mod seat;
pub mod user;
