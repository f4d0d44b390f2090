/// Price charged for a seat: base fare times the seat's multiplier, rounded
/// to the cent. Seat listings and bookings both go through here.
pub fn seat_price(base_price: f64, price_multiplier: f64) -> f64 {
    (base_price * price_multiplier * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_multipliers() {
        assert_eq!(seat_price(5000.0, 1.0), 5000.0);
        assert_eq!(seat_price(5000.0, 1.5), 7500.0);
        assert_eq!(seat_price(5000.0, 2.0), 10000.0);
    }

    #[test]
    fn test_rounds_to_cents() {
        assert_eq!(seat_price(1234.56, 1.5), 1851.84);
        assert_eq!(seat_price(100.0, 1.333), 133.3);
        assert_eq!(seat_price(0.1, 3.0), 0.3);
    }
}
