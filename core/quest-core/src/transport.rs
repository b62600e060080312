//! Outbound HTTP.
//!
//! [`PathTransport`] is the seam between the request services and the network;
//! [`HttpTransport`] is the blocking `reqwest` implementation used outside tests.
//! A transport reports any HTTP status as a response. Only failures to get a
//! response at all are errors.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use url::Url;

use crate::error::{QuestError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("GET {url} timed out")]
    Timeout { url: String },

    #[error("GET {url} failed: {details}")]
    Request { url: String, details: String },
}

pub trait PathTransport: Send + Sync {
    fn get(&self, url: &Url) -> std::result::Result<ApiResponse, TransportError>;
}

impl<T: PathTransport + ?Sized> PathTransport for std::sync::Arc<T> {
    fn get(&self, url: &Url) -> std::result::Result<ApiResponse, TransportError> {
        (**self).get(url)
    }
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// `timeout` of `None` waits indefinitely.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| QuestError::HttpClient(e.to_string()))?;
        Ok(Self { client })
    }
}

impl PathTransport for HttpTransport {
    fn get(&self, url: &Url) -> std::result::Result<ApiResponse, TransportError> {
        let classify = |err: reqwest::Error| {
            if err.is_timeout() {
                TransportError::Timeout {
                    url: url.to_string(),
                }
            } else {
                TransportError::Request {
                    url: url.to_string(),
                    details: err.to_string(),
                }
            }
        };

        let response = self.client.get(url.clone()).send().map_err(classify)?;
        let status = response.status().as_u16();
        let body = response.bytes().map_err(classify)?.to_vec();

        tracing::debug!(%url, status, bytes = body.len(), "API response");
        Ok(ApiResponse { status, body })
    }
}
