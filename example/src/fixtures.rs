//! Literal inputs of the booking lifecycle scenario.

use crate::data::{
    auth::Credentials,
    booking::{Booking, BookingDates},
};
use chrono::NaiveDate;

pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "password123";

/// Total price sent by the partial update.
pub const PATCHED_TOTAL_PRICE: u32 = 321;

pub fn default_credentials() -> Credentials {
    Credentials::new(DEFAULT_USERNAME, DEFAULT_PASSWORD)
}

/// `{"John","Smith",123,true,"2024-01-01","2025-01-10","Test Value"}`
pub fn original_booking() -> Booking {
    booking("John", "Smith", 123, true, (2024, 1, 1), (2025, 1, 10), "Test Value")
}

/// `{"Mary","Adams",321,true,"2024-01-01","2025-01-10","Breakfast"}`
pub fn replacement_booking() -> Booking {
    booking(
        "Mary",
        "Adams",
        PATCHED_TOTAL_PRICE,
        true,
        (2024, 1, 1),
        (2025, 1, 10),
        "Breakfast",
    )
}

fn booking(
    first_name: &str,
    last_name: &str,
    total_price: u32,
    deposit_paid: bool,
    checkin: (i32, u32, u32),
    checkout: (i32, u32, u32),
    additional_needs: &str,
) -> Booking {
    Booking {
        first_name: first_name.into(),
        last_name: last_name.into(),
        total_price,
        deposit_paid,
        booking_dates: BookingDates {
            checkin: date(checkin),
            checkout: date(checkout),
        },
        additional_needs: additional_needs.into(),
    }
}

fn date((year, month, day): (i32, u32, u32)) -> NaiveDate {
    // only called with the literal dates above
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// The three inputs a scenario run is driven by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioFixtures {
    pub original: Booking,
    pub patched_total_price: u32,
    pub replacement: Booking,
}

impl Default for ScenarioFixtures {
    fn default() -> Self {
        Self {
            original: original_booking(),
            patched_total_price: PATCHED_TOTAL_PRICE,
            replacement: replacement_booking(),
        }
    }
}
