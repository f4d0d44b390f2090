use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use uuid::Uuid;

const SUFFIX_LEN: usize = 6;

/// Booking reference: `BK`, the UTC second, then a random uppercase suffix so
/// two bookings in the same instant still differ.
pub fn booking_reference() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(|c| char::from(c).to_ascii_uppercase())
        .collect();

    format!("BK{}{}", Utc::now().format("%y%m%d%H%M%S"), suffix)
}

pub fn transaction_id() -> String {
    format!("TXN{}", Uuid::new_v4().simple()).to_uppercase()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_booking_reference_shape() {
        let reference = booking_reference();
        assert!(reference.starts_with("BK"));
        assert_eq!(reference.len(), 2 + 12 + SUFFIX_LEN);
        assert!(reference[2..14].chars().all(|c| c.is_ascii_digit()));
        assert!(reference[14..]
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_same_instant_references_differ() {
        // An occasional collision is possible and handled at insert time
        let refs: HashSet<String> = (0..100).map(|_| booking_reference()).collect();
        assert!(refs.len() >= 99);
    }

    #[test]
    fn test_transaction_id_shape() {
        let id = transaction_id();
        assert!(id.starts_with("TXN"));
        assert_eq!(id.len(), 3 + 32);
        assert_ne!(id, transaction_id());
    }
}
