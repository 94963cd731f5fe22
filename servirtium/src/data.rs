use std::collections::BTreeMap;

/// Header names are stored lowercase and sorted so recordings are stable between runs.
pub type Headers = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionData {
    pub interaction_number: usize,
    pub request_data: RequestData,
    pub response_data: ResponseData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestData {
    pub uri: String,
    pub method: String,
    pub headers: Headers,
    pub body: String,
}

impl RequestData {
    /// `METHOD URI`, the part of a request that playback matches on.
    pub fn describe(&self) -> String {
        format!("{} {}", self.method, self.uri)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseData {
    pub status_code: u16,
    pub headers: Headers,
    pub body: String,
}
