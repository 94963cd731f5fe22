use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier the service assigns to a created booking.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct BookingId(pub u64);

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingDates {
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
}

/// A booking as it is sent to `POST /booking` and `PUT /booking/{id}` and echoed back.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    #[serde(rename = "firstname")]
    pub first_name: String,
    #[serde(rename = "lastname")]
    pub last_name: String,
    #[serde(rename = "totalprice")]
    pub total_price: u32,
    #[serde(rename = "depositpaid")]
    pub deposit_paid: bool,
    #[serde(rename = "bookingdates")]
    pub booking_dates: BookingDates,
    #[serde(rename = "additionalneeds", default)]
    pub additional_needs: String,
}

/// Body of `PATCH /booking/{id}`. Only the fields that are set are sent.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingPatch {
    #[serde(rename = "firstname", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(rename = "lastname", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(rename = "totalprice", skip_serializing_if = "Option::is_none")]
    pub total_price: Option<u32>,
    #[serde(rename = "depositpaid", skip_serializing_if = "Option::is_none")]
    pub deposit_paid: Option<bool>,
    #[serde(rename = "bookingdates", skip_serializing_if = "Option::is_none")]
    pub booking_dates: Option<BookingDates>,
    #[serde(rename = "additionalneeds", skip_serializing_if = "Option::is_none")]
    pub additional_needs: Option<String>,
}

impl BookingPatch {
    pub fn total_price(total_price: u32) -> Self {
        Self {
            total_price: Some(total_price),
            ..Self::default()
        }
    }

    /// The booking the service should hold once this patch is applied to `booking`.
    pub fn apply_to(&self, booking: &Booking) -> Booking {
        let mut patched = booking.clone();
        if let Some(first_name) = &self.first_name {
            patched.first_name = first_name.clone();
        }
        if let Some(last_name) = &self.last_name {
            patched.last_name = last_name.clone();
        }
        if let Some(total_price) = self.total_price {
            patched.total_price = total_price;
        }
        if let Some(deposit_paid) = self.deposit_paid {
            patched.deposit_paid = deposit_paid;
        }
        if let Some(booking_dates) = self.booking_dates {
            patched.booking_dates = booking_dates;
        }
        if let Some(additional_needs) = &self.additional_needs {
            patched.additional_needs = additional_needs.clone();
        }
        patched
    }
}

/// Response of `POST /booking`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CreatedBooking {
    #[serde(rename = "bookingid")]
    pub booking_id: BookingId,
    pub booking: Booking,
}

/// Element of the `GET /booking` response.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingIdEntry {
    #[serde(rename = "bookingid")]
    pub booking_id: BookingId,
}

/// Query parameters accepted by `GET /booking`.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingFilter {
    #[serde(rename = "firstname", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(rename = "lastname", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkin: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout: Option<NaiveDate>,
}

impl BookingFilter {
    pub fn by_name<F: Into<String>, L: Into<String>>(first_name: F, last_name: L) -> Self {
        Self {
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
