//! HTTP transport used by [`ApiClient`](super::ApiClient).
//!
//! The client builds a fully formed [`ApiRequest`] and hands it to a
//! [`Transport`], which performs exactly one round trip and returns the status
//! together with the complete body.

use reqwest::blocking::Client;
use reqwest::{Method, StatusCode};

use crate::error::{Error, Result};

/// A request ready to be sent.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    /// Header name/value pairs, in insertion order.
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    /// Returns the value of the first header called `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status and fully read body of a response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// Performs a single HTTP round trip.
///
/// Implementations report a failure to reach the service as
/// [`Error::Network`] and a failure to read the body as [`Error::Io`].
pub trait Transport {
    fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// Blocking reqwest transport.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::Network(Box::new(e)))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let mut builder = self.client.request(request.method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().map_err(|e| Error::Network(Box::new(e)))?;
        let status = response.status();
        let body = response.bytes().map_err(|e| Error::Io(Box::new(e)))?;

        Ok(ApiResponse {
            status,
            body: body.to_vec(),
        })
    }
}
