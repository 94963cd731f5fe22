//! Black-box client and lifecycle scenario for the Restful Booker booking API.

mod booking_api_client;
mod config;
pub mod data;
mod error;
pub mod fixtures;
mod scenario;

pub use booking_api_client::{
    ApiResponse, BookingApiClient, BookingApiClientBuilder, DEFAULT_DOMAIN_NAME,
};
pub use config::{BookerConfiguration, BASE_URL_ENV, PASSWORD_ENV, TIMEOUT_ENV, USERNAME_ENV};
pub use error::Error;
pub use scenario::{BookingApiScenario, ScenarioReport, ScenarioStep, StepOutcome};
