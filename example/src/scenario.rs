//! The booking lifecycle scenario: authenticate, list, create, patch, put, then delete and
//! confirm the booking is gone.
//!
//! The session token and the booking id are fields of [`BookingApiScenario`], written once by
//! the step that produces them and read by every later step. A step that runs without them fails
//! with [`Error::MissingPrecondition`] before sending anything.

use crate::{
    booking_api_client::{ApiResponse, BookingApiClient},
    data::{
        auth::{Credentials, SessionToken, TokenResponse},
        booking::{Booking, BookingFilter, BookingId, BookingIdEntry, BookingPatch, CreatedBooking},
    },
    error::Error,
    fixtures::ScenarioFixtures,
};
use std::fmt::{self, Debug};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioStep {
    Authenticate,
    ListBookings,
    CreateBooking,
    PatchBooking,
    PutBooking,
    ReadBeforeDelete,
    DeleteBooking,
    ReadAfterDelete,
}

impl ScenarioStep {
    pub fn name(self) -> &'static str {
        match self {
            ScenarioStep::Authenticate => "authenticate",
            ScenarioStep::ListBookings => "list bookings",
            ScenarioStep::CreateBooking => "create booking",
            ScenarioStep::PatchBooking => "patch booking",
            ScenarioStep::PutBooking => "put booking",
            ScenarioStep::ReadBeforeDelete => "read before delete",
            ScenarioStep::DeleteBooking => "delete booking",
            ScenarioStep::ReadAfterDelete => "read after delete",
        }
    }
}

impl fmt::Display for ScenarioStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug)]
pub struct StepOutcome {
    pub step: ScenarioStep,
    pub result: Result<(), Error>,
}

/// Per-step results of [`BookingApiScenario::run`].
#[derive(Debug, Default)]
pub struct ScenarioReport {
    pub booking_id: Option<BookingId>,
    outcomes: Vec<StepOutcome>,
}

impl ScenarioReport {
    fn record(&mut self, step: ScenarioStep, result: Result<(), Error>) {
        match &result {
            Ok(()) => info!(%step, "step passed"),
            Err(error) => warn!(%step, %error, "step failed"),
        }

        self.outcomes.push(StepOutcome { step, result });
    }

    pub fn outcomes(&self) -> &[StepOutcome] {
        &self.outcomes
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.result.is_err())
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}

#[derive(Debug)]
pub struct BookingApiScenario {
    client: BookingApiClient,
    credentials: Credentials,
    session_token: Option<SessionToken>,
    booking_id: Option<BookingId>,
    // the booking as the service last confirmed it
    confirmed: Option<Booking>,
}

impl BookingApiScenario {
    pub fn new(client: BookingApiClient, credentials: Credentials) -> Self {
        Self {
            client,
            credentials,
            session_token: None,
            booking_id: None,
            confirmed: None,
        }
    }

    pub fn session_token(&self) -> Option<&SessionToken> {
        self.session_token.as_ref()
    }

    pub fn booking_id(&self) -> Option<BookingId> {
        self.booking_id
    }

    /// Runs every step in order against one session and one booking.
    ///
    /// # Returns
    /// `Err` only when authentication fails. Later failures are collected in the report; each
    /// following step still runs and fails fast if it lacks the state a failed step should have
    /// produced.
    pub fn run(&mut self, fixtures: &ScenarioFixtures) -> Result<ScenarioReport, Error> {
        self.authenticate()?;

        let mut report = ScenarioReport::default();
        report.record(ScenarioStep::ListBookings, self.list_bookings().map(|_| ()));
        report.record(
            ScenarioStep::CreateBooking,
            self.create_booking(&fixtures.original).map(|_| ()),
        );
        report.record(
            ScenarioStep::PatchBooking,
            self.patch_total_price(fixtures.patched_total_price)
                .map(|_| ()),
        );
        report.record(
            ScenarioStep::PutBooking,
            self.put_booking(&fixtures.replacement).map(|_| ()),
        );
        report.record(ScenarioStep::DeleteBooking, self.delete_lifecycle());

        report.booking_id = self.booking_id;
        Ok(report)
    }

    /// Exchanges the credentials for a session token.
    pub fn authenticate(&mut self) -> Result<&SessionToken, Error> {
        let response = self.client.create_token(&self.credentials)?;
        if response.status != 200 {
            return Err(Error::AuthFailure(format!(
                "expected HTTP 200, got {}",
                response.status
            )));
        }

        let body: TokenResponse = response
            .json()
            .map_err(|e| Error::AuthFailure(format!("unreadable token response: {}", e)))?;

        let token = match body.token.and_then(SessionToken::new) {
            Some(token) => token,
            None => {
                return Err(Error::AuthFailure(
                    body.reason
                        .unwrap_or_else(|| String::from("the response carried no token")),
                ))
            }
        };

        info!(step = %ScenarioStep::Authenticate, "session token obtained");
        Ok(self.session_token.insert(token))
    }

    /// Lists every booking id. An empty list fails: the service is expected to hold data.
    pub fn list_bookings(&self) -> Result<Vec<BookingId>, Error> {
        let step = ScenarioStep::ListBookings;
        let response = self.client.get_booking_ids(&BookingFilter::default())?;
        expect_status(step, &response, 200)?;

        let entries: Vec<BookingIdEntry> = response.json()?;
        if entries.is_empty() {
            return Err(Error::EmptyBookingList(step));
        }

        info!(%step, count = entries.len(), "bookings listed");
        Ok(entries.into_iter().map(|entry| entry.booking_id).collect())
    }

    /// Creates `booking` and checks the service echoes every field back unchanged.
    pub fn create_booking(&mut self, booking: &Booking) -> Result<BookingId, Error> {
        let step = ScenarioStep::CreateBooking;
        let response = self.client.create_booking(booking)?;
        expect_status(step, &response, 200)?;

        let created: CreatedBooking = response.json()?;
        self.booking_id = Some(created.booking_id);
        self.confirmed = Some(created.booking.clone());

        verify_booking(step, booking, &created.booking)?;

        info!(%step, booking_id = %created.booking_id, "booking created");
        Ok(created.booking_id)
    }

    /// Changes only the total price, then reads the booking back to check nothing else moved.
    pub fn patch_total_price(&mut self, total_price: u32) -> Result<Booking, Error> {
        let step = ScenarioStep::PatchBooking;
        let (booking_id, token) = self.preconditions(step)?;
        let patch = BookingPatch::total_price(total_price);

        let response = self
            .client
            .partial_update_booking(booking_id, &token, &patch)?;
        expect_status(step, &response, 200)?;

        let patched: Booking = response.json()?;
        compare_field(step, "totalprice", &total_price, &patched.total_price)?;

        let stored = self.read_booking(step, booking_id)?;
        let expected = match &self.confirmed {
            Some(confirmed) => patch.apply_to(confirmed),
            None => patched,
        };
        verify_booking(step, &expected, &stored)?;

        info!(%step, %booking_id, total_price, "booking patched");
        self.confirmed = Some(stored.clone());
        Ok(stored)
    }

    /// Replaces the whole booking, then reads it back.
    pub fn put_booking(&mut self, booking: &Booking) -> Result<Booking, Error> {
        let step = ScenarioStep::PutBooking;
        let (booking_id, token) = self.preconditions(step)?;

        let response = self.client.update_booking(booking_id, &token, booking)?;
        expect_status(step, &response, 200)?;

        let updated: Booking = response.json()?;
        compare_field(step, "firstname", &booking.first_name, &updated.first_name)?;
        compare_field(step, "lastname", &booking.last_name, &updated.last_name)?;

        let stored = self.read_booking(step, booking_id)?;
        verify_booking(step, booking, &stored)?;

        info!(%step, %booking_id, "booking replaced");
        self.confirmed = Some(stored.clone());
        Ok(stored)
    }

    /// The booking exists (200), is deleted (201) and is gone afterwards (404).
    pub fn delete_lifecycle(&mut self) -> Result<(), Error> {
        let (booking_id, token) = self.preconditions(ScenarioStep::DeleteBooking)?;

        let before = self.client.get_booking(booking_id)?;
        expect_status(ScenarioStep::ReadBeforeDelete, &before, 200)?;

        let deleted = self.client.delete_booking(booking_id, &token)?;
        expect_status(ScenarioStep::DeleteBooking, &deleted, 201)?;
        self.confirmed = None;

        let after = self.client.get_booking(booking_id)?;
        expect_status(ScenarioStep::ReadAfterDelete, &after, 404)?;

        info!(step = %ScenarioStep::DeleteBooking, %booking_id, "booking deleted");
        Ok(())
    }

    fn preconditions(&self, step: ScenarioStep) -> Result<(BookingId, SessionToken), Error> {
        let token = self
            .session_token
            .clone()
            .ok_or(Error::MissingPrecondition {
                step,
                missing: "session token",
            })?;
        let booking_id = self.booking_id.ok_or(Error::MissingPrecondition {
            step,
            missing: "booking id",
        })?;

        Ok((booking_id, token))
    }

    fn read_booking(&self, step: ScenarioStep, booking_id: BookingId) -> Result<Booking, Error> {
        let response = self.client.get_booking(booking_id)?;
        expect_status(step, &response, 200)?;
        response.json()
    }
}

fn expect_status(step: ScenarioStep, response: &ApiResponse, expected: u16) -> Result<(), Error> {
    if response.status == expected {
        Ok(())
    } else {
        Err(Error::UnexpectedStatus {
            step,
            expected,
            actual: response.status,
        })
    }
}

fn compare_field<T: PartialEq + Debug>(
    step: ScenarioStep,
    field: &'static str,
    expected: &T,
    actual: &T,
) -> Result<(), Error> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::FieldMismatch {
            step,
            field,
            expected: format!("{:?}", expected),
            actual: format!("{:?}", actual),
        })
    }
}

/// Fails on the first field of `actual` that differs from `expected`.
fn verify_booking(step: ScenarioStep, expected: &Booking, actual: &Booking) -> Result<(), Error> {
    compare_field(step, "firstname", &expected.first_name, &actual.first_name)?;
    compare_field(step, "lastname", &expected.last_name, &actual.last_name)?;
    compare_field(step, "totalprice", &expected.total_price, &actual.total_price)?;
    compare_field(step, "depositpaid", &expected.deposit_paid, &actual.deposit_paid)?;
    compare_field(
        step,
        "bookingdates.checkin",
        &expected.booking_dates.checkin,
        &actual.booking_dates.checkin,
    )?;
    compare_field(
        step,
        "bookingdates.checkout",
        &expected.booking_dates.checkout,
        &actual.booking_dates.checkout,
    )?;
    compare_field(
        step,
        "additionalneeds",
        &expected.additional_needs,
        &actual.additional_needs,
    )
}
