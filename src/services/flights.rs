use std::collections::HashMap;

use chrono::{DateTime, NaiveDate};
use sea_orm::{
    sea_query::{Expr, Func},
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};

use crate::entities::{flight, seat};
use crate::error::{AppError, AppResult};
use crate::utils::fare::seat_price;

/// Raw query string of `GET /api/flights/search`.
#[derive(Debug, Default, Deserialize)]
pub struct FlightSearchParams {
    pub departure: Option<String>,
    pub arrival: Option<String>,
    pub date: Option<String>,
    pub passengers: Option<String>,
}

/// A validated flight search.
///
/// `date` is required and validated but flights are matched on the city pair
/// alone; callers filter by day themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightSearch {
    pub departure: String,
    pub arrival: String,
    pub date: NaiveDate,
    pub passengers: i64,
}

impl TryFrom<FlightSearchParams> for FlightSearch {
    type Error = AppError;

    fn try_from(params: FlightSearchParams) -> AppResult<Self> {
        let missing = || AppError::BadRequest("Missing required search fields".to_string());
        let present = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let departure = present(params.departure).ok_or_else(missing)?;
        let arrival = present(params.arrival).ok_or_else(missing)?;
        let date = present(params.date).ok_or_else(missing)?;
        let date = parse_search_date(&date)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid date: {}", date)))?;

        let passengers = params
            .passengers
            .and_then(|p| p.trim().parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);

        Ok(Self {
            departure,
            arrival,
            date,
            passengers,
        })
    }
}

fn parse_search_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

#[derive(Debug, Serialize)]
pub struct FlightSummary {
    #[serde(flatten)]
    pub flight: flight::Model,
    pub available_seats_count: i64,
}

#[derive(Debug, Serialize)]
pub struct SeatView {
    pub id: i32,
    pub seat_number: String,
    pub class: String,
    pub is_available: bool,
    pub price_multiplier: f64,
    pub price: f64,
}

#[derive(Debug, Serialize)]
pub struct FlightDetail {
    pub flight: flight::Model,
    pub seats: Vec<SeatView>,
}

/// Flights on the requested city pair (case-insensitive) with at least
/// `passengers` seats free, earliest departure first.
pub async fn search_flights(
    db: &DatabaseConnection,
    search: &FlightSearch,
) -> AppResult<Vec<FlightSummary>> {
    // Both sides go through the database's LOWER so they fold identically
    let flights = flight::Entity::find()
        .filter(
            Expr::expr(Func::lower(Expr::col(flight::Column::DepartureCity)))
                .eq(Func::lower(Expr::val(search.departure.as_str()))),
        )
        .filter(
            Expr::expr(Func::lower(Expr::col(flight::Column::ArrivalCity)))
                .eq(Func::lower(Expr::val(search.arrival.as_str()))),
        )
        .order_by_asc(flight::Column::DepartureTime)
        .order_by_asc(flight::Column::Id)
        .all(db)
        .await?;

    if flights.is_empty() {
        return Ok(Vec::new());
    }

    let counts = available_seat_counts(db, flights.iter().map(|f| f.id).collect()).await?;

    let results: Vec<FlightSummary> = flights
        .into_iter()
        .map(|f| {
            let available_seats_count = counts.get(&f.id).copied().unwrap_or(0);
            FlightSummary {
                flight: f,
                available_seats_count,
            }
        })
        .filter(|summary| summary.available_seats_count >= search.passengers)
        .collect();

    tracing::debug!(
        departure = %search.departure,
        arrival = %search.arrival,
        date = %search.date,
        passengers = search.passengers,
        results = results.len(),
        "Flight search"
    );

    Ok(results)
}

/// Live count of available seats per flight, computed from the seat rows
/// rather than the cached counter.
async fn available_seat_counts(
    db: &DatabaseConnection,
    flight_ids: Vec<i32>,
) -> AppResult<HashMap<i32, i64>> {
    let rows: Vec<(i32, i64)> = seat::Entity::find()
        .select_only()
        .column(seat::Column::FlightId)
        .column_as(Expr::col(seat::Column::Id).count(), "available")
        .filter(seat::Column::FlightId.is_in(flight_ids))
        .filter(seat::Column::IsAvailable.eq(true))
        .group_by(seat::Column::FlightId)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows.into_iter().collect())
}

/// A flight with its full seat map ordered by seat id.
pub async fn flight_detail(db: &DatabaseConnection, flight_id: i32) -> AppResult<FlightDetail> {
    let flight = flight::Entity::find_by_id(flight_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Flight not found".to_string()))?;

    let seats = seat::Entity::find()
        .filter(seat::Column::FlightId.eq(flight.id))
        .order_by_asc(seat::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|s| SeatView {
            price: seat_price(flight.price, s.price_multiplier),
            id: s.id,
            seat_number: s.seat_number,
            class: s.class,
            is_available: s.is_available,
            price_multiplier: s.price_multiplier,
        })
        .collect();

    Ok(FlightDetail { flight, seats })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(departure: &str, arrival: &str, date: &str, passengers: Option<&str>) -> FlightSearchParams {
        FlightSearchParams {
            departure: Some(departure.to_string()),
            arrival: Some(arrival.to_string()),
            date: Some(date.to_string()),
            passengers: passengers.map(str::to_string),
        }
    }

    #[test]
    fn test_search_requires_route_and_date() {
        let mut p = params("Delhi", "Mumbai", "2025-03-01", None);
        p.date = None;
        assert!(matches!(FlightSearch::try_from(p), Err(AppError::BadRequest(_))));

        let p = params("  ", "Mumbai", "2025-03-01", None);
        assert!(matches!(FlightSearch::try_from(p), Err(AppError::BadRequest(_))));

        let p = FlightSearchParams::default();
        assert!(FlightSearch::try_from(p).is_err());
    }

    #[test]
    fn test_search_trims_and_defaults_passengers() {
        let search = FlightSearch::try_from(params(" Delhi ", "Mumbai", "2025-03-01", None)).unwrap();
        assert_eq!(search.departure, "Delhi");
        assert_eq!(search.passengers, 1);
        assert_eq!(search.date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());

        let search = FlightSearch::try_from(params("Delhi", "Mumbai", "2025-03-01", Some("abc"))).unwrap();
        assert_eq!(search.passengers, 1);

        let search = FlightSearch::try_from(params("Delhi", "Mumbai", "2025-03-01", Some("0"))).unwrap();
        assert_eq!(search.passengers, 1);

        let search = FlightSearch::try_from(params("Delhi", "Mumbai", "2025-03-01", Some("3"))).unwrap();
        assert_eq!(search.passengers, 3);
    }

    #[test]
    fn test_search_date_formats() {
        let search =
            FlightSearch::try_from(params("Delhi", "Mumbai", "2025-03-01T08:30:00Z", None)).unwrap();
        assert_eq!(search.date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());

        let bad = FlightSearch::try_from(params("Delhi", "Mumbai", "01/03/2025", None));
        assert!(matches!(bad, Err(AppError::BadRequest(_))));
    }
}
