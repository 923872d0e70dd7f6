//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;

use blitz::api::{ApiRequest, ApiResponse, Transport};
use blitz::{ApiClient, ClientConfig, Result};
use reqwest::StatusCode;

/// Transport that replays scripted responses in order and records requests.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: RefCell<VecDeque<ApiResponse>>,
    pub requests: RefCell<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: StatusCode, body: &str) -> Self {
        self.responses.borrow_mut().push_back(ApiResponse {
            status,
            body: body.as_bytes().to_vec(),
        });
        self
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests.borrow().iter().map(|r| r.url.clone()).collect()
    }

    pub fn body_json(&self, index: usize) -> serde_json::Value {
        let requests = self.requests.borrow();
        serde_json::from_slice(requests[index].body.as_deref().unwrap_or(b"null")).unwrap()
    }
}

impl Transport for &ScriptedTransport {
    fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.requests.borrow_mut().push(request);
        let next = self.responses.borrow_mut().pop_front();
        Ok(next.unwrap_or(ApiResponse {
            status: StatusCode::NOT_IMPLEMENTED,
            body: b"no scripted response".to_vec(),
        }))
    }
}

pub fn client(transport: &ScriptedTransport) -> ApiClient<&ScriptedTransport> {
    ApiClient::with_transport(ClientConfig::with_address("http://blitz.test"), transport)
}
