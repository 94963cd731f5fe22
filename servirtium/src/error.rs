use crate::markdown;
use hyper::http;
use std::{io, sync};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IoError: {0}")]
    IoError(#[from] io::Error),
    #[error("The lock was poisoned")]
    PoisonedLock,
    #[error("The status code is invalid")]
    InvalidStatusCode,
    #[error("The HTTP method is invalid")]
    InvalidMethod,
    #[error("The server hasn't been configured with a domain name to record from")]
    NotConfigured,
    #[error("reqwest error: {0}")]
    ReqwestError(#[from] reqwest::Error),
    #[error("Invalid header name")]
    InvalidHeaderName,
    #[error("Invalid header value")]
    InvalidHeaderValue,
    #[error("Invalid body")]
    InvalidBody,
    #[error("Hyper error: {0}")]
    HyperError(#[from] hyper::Error),
    #[error("Http Error: {0}")]
    HttpError(#[from] http::Error),
    #[error("Markdown error: {0}")]
    MarkdownError(#[from] markdown::Error),
    #[error("Interaction manager error: {0}")]
    InteractionManagerError(Box<dyn std::error::Error + Send + Sync>),
    #[error("The recorded interactions differ from the markdown: {0}")]
    MarkdownDataChanged(Box<dyn std::error::Error + Send + Sync>),
    #[error("Interaction {number} was not recorded, the markdown has {recorded} interactions")]
    InteractionOutOfRange { number: usize, recorded: usize },
    #[error("Interaction {number} was recorded as {expected} but the request was {actual}")]
    InteractionMismatch {
        number: usize,
        expected: String,
        actual: String,
    },
    #[error("Only {played} of {recorded} recorded interactions were played back")]
    UnplayedInteractions { played: usize, recorded: usize },
    #[error("The Servirtium server thread panicked")]
    ServerThreadPanicked,
}

impl<T> From<sync::PoisonError<T>> for Error {
    fn from(_: sync::PoisonError<T>) -> Self {
        Error::PoisonedLock
    }
}

impl From<hyper::header::InvalidHeaderName> for Error {
    fn from(_: hyper::header::InvalidHeaderName) -> Self {
        Error::InvalidHeaderName
    }
}

impl From<hyper::header::InvalidHeaderValue> for Error {
    fn from(_: hyper::header::InvalidHeaderValue) -> Self {
        Error::InvalidHeaderValue
    }
}
