use crate::{
    data::{RequestData, ResponseData},
    error::Error,
    util,
};
use async_trait::async_trait;
use reqwest::{header::HeaderMap, Method};
use std::fmt::Debug;

/// Sends a recorded request to the real service while recording.
#[async_trait]
pub trait HttpClient: Debug {
    async fn make_request(
        &self,
        domain_name: &str,
        request_data: &RequestData,
    ) -> Result<ResponseData, Error>;
}

#[derive(Debug, Default)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn make_request(
        &self,
        domain_name: &str,
        request_data: &RequestData,
    ) -> Result<ResponseData, Error> {
        let url = format!("{}{}", domain_name.trim_end_matches('/'), request_data.uri);
        let method =
            Method::from_bytes(request_data.method.as_bytes()).map_err(|_| Error::InvalidMethod)?;

        let mut headers = HeaderMap::new();
        util::put_headers(&mut headers, util::forwardable(&request_data.headers))?;

        let mut request_builder = self.client.request(method, url.as_str()).headers(headers);
        if !request_data.body.is_empty() {
            request_builder = request_builder.body(request_data.body.clone());
        }

        tracing::debug!(%url, method = %request_data.method, "forwarding request");
        let response = request_builder.send().await?;

        let status_code = response.status().as_u16();
        let headers = util::extract_headers(response.headers());
        let body = response.bytes().await?;

        Ok(ResponseData {
            status_code,
            headers,
            body: String::from_utf8_lossy(&body).into(),
        })
    }
}
