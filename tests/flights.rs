#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use flight_booking_backend::db::seed::seed_sample_flights;
use flight_booking_backend::services::booking::create_booking;
use flight_booking_backend::services::flights::{flight_detail, search_flights, FlightSearch, FlightSearchParams};
use flight_booking_backend::AppError;

use common::{insert_flight, insert_user, passenger, setup_db};

fn search(departure: &str, arrival: &str, passengers: Option<&str>) -> FlightSearch {
    FlightSearch::try_from(FlightSearchParams {
        departure: Some(departure.to_string()),
        arrival: Some(arrival.to_string()),
        date: Some("2025-03-01".to_string()),
        passengers: passengers.map(str::to_string),
    })
    .unwrap()
}

#[tokio::test]
async fn test_search_matches_route_case_insensitively() {
    let db = setup_db().await;
    let (late, _) = insert_flight(&db, "AI101", "Delhi", "Mumbai", 48, 5000.0, &[("1A", 1.0)]).await;
    let (early, _) = insert_flight(&db, "6E205", "Delhi", "Mumbai", 12, 4200.0, &[("1A", 1.0)]).await;
    insert_flight(&db, "UK944", "Mumbai", "Delhi", 24, 5600.0, &[("1A", 1.0)]).await;

    let results = search_flights(&db, &search("delhi", "MUMBAI", None)).await.unwrap();

    let ids: Vec<i32> = results.iter().map(|r| r.flight.id).collect();
    assert_eq!(ids, vec![early.id, late.id]);
    assert!(results.iter().all(|r| r.available_seats_count == 1));
}

#[tokio::test]
async fn test_search_matches_non_ascii_city() {
    let db = setup_db().await;
    let (munich, _) = insert_flight(&db, "LH761", "MÜNCHEN", "Delhi", 24, 38000.0, &[("1A", 1.0)]).await;

    let results = search_flights(&db, &search("MÜNCHEN", "Delhi", None)).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].flight.id, munich.id);

    let results = search_flights(&db, &search("MÜNCHEN", "DELHI", None)).await.unwrap();
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn test_search_respects_passenger_count() {
    let db = setup_db().await;
    let user = insert_user(&db, "asha").await;
    let (roomy, _) =
        insert_flight(&db, "AI101", "Delhi", "Mumbai", 24, 5000.0, &[("1A", 1.0), ("1B", 1.0), ("1C", 1.0)]).await;
    let (tight, tight_seats) =
        insert_flight(&db, "6E205", "Delhi", "Mumbai", 30, 4200.0, &[("1A", 1.0), ("1B", 1.0)]).await;

    create_booking(&db, user.id, tight.id, tight_seats[0].id, passenger()).await.unwrap();

    let results = search_flights(&db, &search("Delhi", "Mumbai", Some("2"))).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].flight.id, roomy.id);
    assert_eq!(results[0].available_seats_count, 3);

    let results = search_flights(&db, &search("Delhi", "Mumbai", None)).await.unwrap();
    assert_eq!(results.len(), 2);
    let tight_result = results.iter().find(|r| r.flight.id == tight.id).unwrap();
    assert_eq!(tight_result.available_seats_count, 1);
}

#[tokio::test]
async fn test_search_without_matches_is_empty() {
    let db = setup_db().await;
    insert_flight(&db, "AI101", "Delhi", "Mumbai", 24, 5000.0, &[("1A", 1.0)]).await;

    let results = search_flights(&db, &search("Chennai", "Mumbai", None)).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_flight_detail_lists_priced_seats() {
    let db = setup_db().await;
    let user = insert_user(&db, "asha").await;
    let (flight, seats) =
        insert_flight(&db, "AI101", "Delhi", "Mumbai", 24, 5000.0, &[("1A", 2.0), ("2A", 1.5), ("3A", 1.0)]).await;
    create_booking(&db, user.id, flight.id, seats[0].id, passenger()).await.unwrap();

    let detail = flight_detail(&db, flight.id).await.unwrap();

    assert_eq!(detail.flight.flight_number, "AI101");
    let numbers: Vec<&str> = detail.seats.iter().map(|s| s.seat_number.as_str()).collect();
    assert_eq!(numbers, vec!["1A", "2A", "3A"]);

    let prices: Vec<f64> = detail.seats.iter().map(|s| s.price).collect();
    assert_eq!(prices, vec![10000.0, 7500.0, 5000.0]);
    assert!(!detail.seats[0].is_available);
    assert!(detail.seats[1].is_available);
}

#[tokio::test]
async fn test_flight_detail_unknown_flight() {
    let db = setup_db().await;
    let err = flight_detail(&db, 42).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_seed_runs_once() {
    let db = setup_db().await;

    assert_eq!(seed_sample_flights(&db).await.unwrap(), 3);
    assert_eq!(seed_sample_flights(&db).await.unwrap(), 0);

    let results = search_flights(&db, &search("Delhi", "Mumbai", Some("24"))).await.unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.flight.available_seats == 24));
}
