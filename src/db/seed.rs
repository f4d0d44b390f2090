use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set, TransactionTrait};

use crate::entities::{flight, seat};
use crate::error::AppResult;

const SEAT_LETTERS: [&str; 4] = ["A", "B", "C", "D"];
const SEAT_ROWS: i32 = 6;

struct SampleFlight {
    flight_number: &'static str,
    airline: &'static str,
    from: &'static str,
    to: &'static str,
    departs_in_hours: i64,
    duration_minutes: i64,
    price: f64,
}

const SAMPLE_FLIGHTS: [SampleFlight; 3] = [
    SampleFlight {
        flight_number: "AI101",
        airline: "Air India",
        from: "Delhi",
        to: "Mumbai",
        departs_in_hours: 30,
        duration_minutes: 130,
        price: 5000.0,
    },
    SampleFlight {
        flight_number: "6E205",
        airline: "IndiGo",
        from: "Delhi",
        to: "Mumbai",
        departs_in_hours: 26,
        duration_minutes: 125,
        price: 4200.0,
    },
    SampleFlight {
        flight_number: "UK944",
        airline: "Vistara",
        from: "Mumbai",
        to: "Delhi",
        departs_in_hours: 50,
        duration_minutes: 135,
        price: 5600.0,
    },
];

/// Seat class and price multiplier for a cabin row.
fn row_class(row: i32) -> (&'static str, f64) {
    match row {
        1 => ("business", 2.0),
        2 => ("premium", 1.5),
        _ => ("economy", 1.0),
    }
}

/// Insert a few flights with seat maps when the flights table is empty.
/// Returns the number of flights created.
pub async fn seed_sample_flights(db: &DatabaseConnection) -> AppResult<usize> {
    if flight::Entity::find().count(db).await? > 0 {
        return Ok(0);
    }

    let txn = db.begin().await?;
    let now = Utc::now();
    let seats_per_flight = SEAT_ROWS * SEAT_LETTERS.len() as i32;

    for sample in SAMPLE_FLIGHTS.iter() {
        let departure = now + Duration::hours(sample.departs_in_hours);
        let arrival = departure + Duration::minutes(sample.duration_minutes);

        let flight = flight::ActiveModel {
            flight_number: Set(sample.flight_number.to_string()),
            airline: Set(sample.airline.to_string()),
            departure_city: Set(sample.from.to_string()),
            arrival_city: Set(sample.to.to_string()),
            departure_time: Set(departure.into()),
            arrival_time: Set(arrival.into()),
            price: Set(sample.price),
            total_seats: Set(seats_per_flight),
            available_seats: Set(seats_per_flight),
            created_at: Set(now.into()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let seats = (1..=SEAT_ROWS).flat_map(|row| {
            let (class, multiplier) = row_class(row);
            SEAT_LETTERS.iter().map(move |letter| seat::ActiveModel {
                flight_id: Set(flight.id),
                seat_number: Set(format!("{}{}", row, letter)),
                class: Set(class.to_string()),
                is_available: Set(true),
                price_multiplier: Set(multiplier),
                ..Default::default()
            })
        });

        seat::Entity::insert_many(seats).exec(&txn).await?;
    }

    txn.commit().await?;
    Ok(SAMPLE_FLIGHTS.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_classes() {
        assert_eq!(row_class(1), ("business", 2.0));
        assert_eq!(row_class(2), ("premium", 1.5));
        assert_eq!(row_class(6), ("economy", 1.0));
    }
}
