//! Environment-backed configuration of a scenario run.
//!
//! Every variable is optional. A variable that is set must hold a usable value: empty strings
//! and malformed timeouts are rejected instead of silently falling back to a default.

use crate::{
    booking_api_client::{BookingApiClient, BookingApiClientBuilder, DEFAULT_DOMAIN_NAME},
    data::auth::Credentials,
    error::Error,
    fixtures::{DEFAULT_PASSWORD, DEFAULT_USERNAME},
};
use std::time::Duration;

pub const BASE_URL_ENV: &str = "RESTFUL_BOOKER_BASE_URL";
pub const USERNAME_ENV: &str = "RESTFUL_BOOKER_USERNAME";
pub const PASSWORD_ENV: &str = "RESTFUL_BOOKER_PASSWORD";
pub const TIMEOUT_ENV: &str = "RESTFUL_BOOKER_TIMEOUT_SECS";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookerConfiguration {
    base_url: String,
    credentials: Credentials,
    timeout: Duration,
}

impl Default for BookerConfiguration {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_DOMAIN_NAME.into(),
            credentials: Credentials::new(DEFAULT_USERNAME, DEFAULT_PASSWORD),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl BookerConfiguration {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from `lookup`, which returns the value of a variable if set.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self, Error> {
        let mut configuration = Self::default();

        if let Some(base_url) = non_empty(&lookup, BASE_URL_ENV)? {
            configuration.base_url = base_url;
        }
        if let Some(username) = non_empty(&lookup, USERNAME_ENV)? {
            configuration.credentials.username = username;
        }
        if let Some(password) = non_empty(&lookup, PASSWORD_ENV)? {
            configuration.credentials.password = password;
        }
        if let Some(timeout) = non_empty(&lookup, TIMEOUT_ENV)? {
            configuration.timeout = parse_timeout(&timeout)?;
        }

        Ok(configuration)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_base_url<S: Into<String>>(&mut self, base_url: S) {
        self.base_url = base_url.into();
    }

    /// A client for the configured service, applying the timeout to every request.
    pub fn client(&self) -> Result<BookingApiClient, Error> {
        let http_client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;

        Ok(BookingApiClientBuilder::new()
            .with_domain_name(self.base_url.as_str())
            .with_http_client(http_client)
            .build())
    }
}

fn non_empty<F: Fn(&str) -> Option<String>>(lookup: &F, key: &str) -> Result<Option<String>, Error> {
    match lookup(key) {
        Some(value) if value.trim().is_empty() => Err(Error::InvalidConfiguration(format!(
            "{} is set but empty",
            key
        ))),
        value => Ok(value),
    }
}

fn parse_timeout(value: &str) -> Result<Duration, Error> {
    match value.trim().parse::<u64>() {
        Ok(seconds) if seconds > 0 => Ok(Duration::from_secs(seconds)),
        _ => Err(Error::InvalidConfiguration(format!(
            "{} must be a positive number of seconds, got {:?}",
            TIMEOUT_ENV, value
        ))),
    }
}
