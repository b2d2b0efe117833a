//! Pairwise duplicate predicate.
//!
//! Missing data never disproves equality: an empty value on either side is
//! compatible with anything. A pair is a duplicate only when both the
//! passenger-identity and the flight-identity checks hold.

use crate::loyalty::loyalty_compatible;
use crate::model::{Field, Record};

/// Wildcard equality: equal after trimming, or either side empty.
pub fn eq_wild(a: &str, b: &str) -> bool {
    let a = a.trim();
    let b = b.trim();
    a.is_empty() || b.is_empty() || a == b
}

pub fn passenger_equal(a: &Record, b: &Record) -> bool {
    Field::PASSENGER
        .iter()
        .all(|&f| eq_wild(a.get(f), b.get(f)))
        && loyalty_compatible(a.get(Field::LoyaltyPairs), b.get(Field::LoyaltyPairs))
}

pub fn flight_equal(a: &Record, b: &Record) -> bool {
    Field::FLIGHT.iter().all(|&f| eq_wild(a.get(f), b.get(f)))
}

/// Duplicate verdict. Pure and symmetric in its arguments.
pub fn is_duplicate(a: &Record, b: &Record) -> bool {
    passenger_equal(a, b) && flight_equal(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flight() -> Record {
        Record::new()
            .with(Field::FlightNo, "LH400")
            .with(Field::FlightDate, "2023-05-01")
            .with(Field::DepAirport, "FRA")
            .with(Field::ArrAirport, "JFK")
    }

    #[test]
    fn eq_wild_cases() {
        assert!(eq_wild("A", "A"));
        assert!(eq_wild("", "A"));
        assert!(eq_wild("A", ""));
        assert!(eq_wild("", ""));
        assert!(eq_wild(" A", "A "));
        assert!(eq_wild("  ", "B"));
        assert!(!eq_wild("A", "B"));
        assert!(!eq_wild("a", "A"));
    }

    #[test]
    fn missing_first_name_still_matches() {
        let a = flight().with(Field::RealLastName, "SMITH").with(Field::RealFirstName, "JOHN");
        let b = flight().with(Field::RealLastName, "SMITH");
        assert!(is_duplicate(&a, &b));
        assert!(is_duplicate(&b, &a));
    }

    #[test]
    fn conflicting_birth_date_rejects() {
        let a = flight().with(Field::ETicket, "1601234567890").with(Field::BirthDate, "1980-01-01");
        let b = flight().with(Field::ETicket, "1601234567890").with(Field::BirthDate, "1990-01-01");
        assert!(flight_equal(&a, &b));
        assert!(!passenger_equal(&a, &b));
        assert!(!is_duplicate(&a, &b));
    }

    #[test]
    fn conflicting_flight_rejects() {
        let a = flight().with(Field::RealLastName, "SMITH");
        let b = flight().with(Field::RealLastName, "SMITH").with(Field::FlightTime, "10:00");
        assert!(is_duplicate(&a, &b));
        let c = a.clone().with(Field::FlightTime, "11:30");
        assert!(passenger_equal(&b, &c));
        assert!(!flight_equal(&b, &c));
        assert!(!is_duplicate(&b, &c));
    }

    #[test]
    fn disjoint_loyalty_rejects() {
        let a = flight().with(Field::LoyaltyPairs, "SU:1");
        let b = flight().with(Field::LoyaltyPairs, "LH:2");
        let c = flight().with(Field::LoyaltyPairs, "LH:2|SU:1");
        assert!(!is_duplicate(&a, &b));
        assert!(is_duplicate(&a, &c));
        assert!(is_duplicate(&b, &c));
    }

    #[test]
    fn ancillary_fields_are_ignored() {
        let a = flight().with(Field::Seat, "12A").with(Field::Meal, "VGML");
        let b = flight().with(Field::Seat, "14C").with(Field::Meal, "KSML");
        assert!(is_duplicate(&a, &b));
    }

    #[test]
    fn empty_records_match() {
        assert!(is_duplicate(&Record::new(), &Record::new()));
    }
}
