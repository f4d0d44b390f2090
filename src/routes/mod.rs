use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::handlers::{self, auth, bookings, flights, payments};
use crate::middleware::auth::auth_middleware;
use crate::middleware::rate_limit::create_user_governor;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Public routes
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let flight_routes = Router::new()
        .route("/flights/search", get(flights::search_flights))
        .route("/flights/{id}", get(flights::get_flight));

    // Authenticated routes, rate limited per user
    // Rate limit: 100 requests per minute
    let booking_routes = Router::new()
        .route("/bookings", post(bookings::create_booking).get(bookings::my_bookings))
        .route("/bookings/{id}/cancel", put(bookings::cancel_booking))
        .route("/payments", post(payments::create_payment))
        .layer(create_user_governor())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", auth_routes.merge(flight_routes).merge(booking_routes))
        .with_state(state)
}
