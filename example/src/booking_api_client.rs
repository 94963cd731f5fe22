use crate::{
    data::{
        auth::{Credentials, SessionToken},
        booking::{Booking, BookingFilter, BookingId, BookingPatch},
    },
    error::Error,
};
use reqwest::header::{ACCEPT, COOKIE};
use serde::de::DeserializeOwned;
use tracing::debug;
type ReqwestClient = reqwest::blocking::Client;
type RequestBuilder = reqwest::blocking::RequestBuilder;

pub const DEFAULT_DOMAIN_NAME: &str = "https://restful-booker.herokuapp.com";

/// Status code and body of a Restful Booker response.
///
/// Non-2xx statuses are not errors here: a 404 after a delete, or a 201 for the delete
/// itself, is exactly what a caller may be waiting for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Builder used to build a BookingApiClient instance
#[derive(Debug, Clone, Default)]
pub struct BookingApiClientBuilder {
    domain_name: Option<String>,
    http_client: Option<ReqwestClient>,
}

impl BookingApiClientBuilder {
    /// Create a new BookingApiClientBuilder instance.
    pub fn new() -> Self {
        Self {
            domain_name: None,
            http_client: None,
        }
    }

    /// Use the given domain_name when building a BookingApiClient instance.
    ///
    /// # Arguments
    /// `domain_name` - a domain name to use when calling the API, with or without a trailing
    ///     slash.
    ///
    /// # Returns
    /// This builder.
    pub fn with_domain_name<T: Into<String>>(mut self, domain_name: T) -> Self {
        self.domain_name = Some(domain_name.into());
        self
    }

    /// Use the given blocking reqwest client when building a BookingApiClient instance.
    ///
    /// # Arguments
    /// `client` - a pre-configured blocking reqwest client.
    ///
    /// # Returns
    /// This builder.
    pub fn with_http_client(mut self, client: ReqwestClient) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Consume the builder and create a BookingApiClient instance using all of the previously
    /// configured values or their defaults.
    ///
    /// # Returns
    /// A BookingApiClient instance.
    pub fn build(mut self) -> BookingApiClient {
        let domain_name = self
            .domain_name
            .take()
            .unwrap_or_else(|| String::from(DEFAULT_DOMAIN_NAME));

        BookingApiClient {
            http: self.http_client.take().unwrap_or_default(),
            domain_name: domain_name.trim_end_matches('/').into(),
        }
    }
}

/// Struct that represents a Restful Booker API client.
#[derive(Debug, Clone)]
pub struct BookingApiClient {
    http: ReqwestClient,
    domain_name: String,
}

impl Default for BookingApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingApiClient {
    /// Create a BookingApiClient for the public Restful Booker with the default reqwest client.
    ///
    /// # Returns
    /// A BookingApiClient.
    pub fn new() -> Self {
        BookingApiClientBuilder::new().build()
    }

    pub fn domain_name(&self) -> &str {
        &self.domain_name
    }

    /// Requests a session token.
    ///
    /// # Arguments
    /// `credentials` - username and password, sent as JSON.
    ///
    /// # Returns
    /// The raw response, carrying `{"token": ...}` or, for bad credentials, `{"reason": ...}`.
    pub fn create_token(&self, credentials: &Credentials) -> Result<ApiResponse, Error> {
        self.execute(self.http.post(self.url("/auth")).json(credentials))
    }

    /// Lists booking ids, optionally narrowed by name or dates.
    ///
    /// # Returns
    /// The raw response, carrying `[{"bookingid": ...}, ...]`.
    pub fn get_booking_ids(&self, filter: &BookingFilter) -> Result<ApiResponse, Error> {
        let mut request = self.http.get(self.url("/booking"));
        if !filter.is_empty() {
            request = request.query(filter);
        }

        self.execute(request)
    }

    pub fn get_booking(&self, booking_id: BookingId) -> Result<ApiResponse, Error> {
        self.execute(self.http.get(self.booking_url(booking_id)))
    }

    /// Creates a booking.
    ///
    /// # Returns
    /// The raw response, carrying `{"bookingid": ..., "booking": {...}}`.
    pub fn create_booking(&self, booking: &Booking) -> Result<ApiResponse, Error> {
        self.execute(self.http.post(self.url("/booking")).json(booking))
    }

    pub fn partial_update_booking(
        &self,
        booking_id: BookingId,
        token: &SessionToken,
        patch: &BookingPatch,
    ) -> Result<ApiResponse, Error> {
        self.execute(
            self.http
                .patch(self.booking_url(booking_id))
                .header(COOKIE, token.cookie())
                .json(patch),
        )
    }

    pub fn update_booking(
        &self,
        booking_id: BookingId,
        token: &SessionToken,
        booking: &Booking,
    ) -> Result<ApiResponse, Error> {
        self.execute(
            self.http
                .put(self.booking_url(booking_id))
                .header(COOKIE, token.cookie())
                .json(booking),
        )
    }

    /// Deletes a booking. The service signals success with `201 Created`.
    pub fn delete_booking(
        &self,
        booking_id: BookingId,
        token: &SessionToken,
    ) -> Result<ApiResponse, Error> {
        self.execute(
            self.http
                .delete(self.booking_url(booking_id))
                .header(COOKIE, token.cookie()),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.domain_name, path)
    }

    fn booking_url(&self, booking_id: BookingId) -> String {
        format!("{}/booking/{}", self.domain_name, booking_id)
    }

    fn execute(&self, request: RequestBuilder) -> Result<ApiResponse, Error> {
        // writes answer 418 without an explicit JSON accept header
        let request = request.header(ACCEPT, "application/json").build()?;
        debug!(method = %request.method(), url = %request.url(), "sending request");

        let response = self.http.execute(request)?;
        let status = response.status().as_u16();
        let body = response.text()?;
        // bodies carry session tokens
        debug!(status, body_length = body.len(), "received response");

        Ok(ApiResponse { status, body })
    }
}
