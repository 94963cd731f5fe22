use crate::scenario::ScenarioStep;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// No usable session token; nothing after authentication can run.
    #[error("Authentication failed: {0}")]
    AuthFailure(String),
    #[error("{step}: expected HTTP {expected}, got {actual}")]
    UnexpectedStatus {
        step: ScenarioStep,
        expected: u16,
        actual: u16,
    },
    #[error("{step}: field `{field}` expected {expected}, got {actual}")]
    FieldMismatch {
        step: ScenarioStep,
        field: &'static str,
        expected: String,
        actual: String,
    },
    #[error("{0}: the service returned no bookings")]
    EmptyBookingList(ScenarioStep),
    #[error("{step} needs a {missing}, which no earlier step produced")]
    MissingPrecondition {
        step: ScenarioStep,
        missing: &'static str,
    },
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("{0}")]
    ReqwestError(#[from] reqwest::Error),
    #[error("{0}")]
    DeserializationError(#[from] serde_json::Error),
}

impl Error {
    /// Failures that make the rest of a scenario run pointless.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::AuthFailure(_))
    }

    /// The service answered, but not with what the scenario expects.
    pub fn is_assertion_failure(&self) -> bool {
        matches!(
            self,
            Error::UnexpectedStatus { .. } | Error::FieldMismatch { .. } | Error::EmptyBookingList(_)
        )
    }
}
