//! Randomized booking generation for exercising the API.
//!
//! Stays are always in the past so generated data never collides with
//! anything a live deployment would treat as an active reservation.

use chrono::{Duration, Local};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::model::{Booking, BookingDates};

const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "Robert", "Patricia", "John", "Jennifer", "Michael", "Linda", "David",
    "Elizabeth",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez",
];

const ADDITIONAL_NEEDS: &[Option<&str>] = &[
    Some("Breakfast"),
    Some("Airport Transfer"),
    Some("Extra Towels"),
    Some("Late Checkout"),
    None,
];

/// Produces a single booking with plausible random contents.
pub fn booking() -> Booking {
    let mut rng = rand::thread_rng();

    // Checkout lands somewhere in the last year, checkin up to two
    // weeks before it.
    let checkout = Local::now().date_naive() - Duration::days(rng.gen_range(1..=365));
    let checkin = checkout - Duration::days(rng.gen_range(1..=14));

    Booking {
        id: None,
        first_name: FIRST_NAMES.choose(&mut rng).unwrap().to_string(),
        last_name: LAST_NAMES.choose(&mut rng).unwrap().to_string(),
        total_price: rng.gen_range(100..=1000),
        deposit_paid: rng.r#gen(),
        dates: BookingDates { checkin, checkout },
        additional_needs: ADDITIONAL_NEEDS
            .choose(&mut rng)
            .unwrap()
            .map(str::to_string),
    }
}

/// Produces `count` independent bookings.
pub fn bookings(count: usize) -> Vec<Booking> {
    (0..count).map(|_| booking()).collect()
}
