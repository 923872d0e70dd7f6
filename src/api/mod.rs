// API client module: a small blocking HTTP client for the blitzlog API.
// Every operation is one request with the same envelope: JSON body,
// `Content-Type: application/json`, an `Auth-Token` header and a single
// expected status code.

pub mod transport;
pub mod types;

use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
use types::*;

/// Address used when none is configured.
pub const DEFAULT_API_ADDRESS: &str = "https://test.blitzlog.com:8080";

/// Number of log entries requested per query.
pub const DEFAULT_PAGE_SIZE: u32 = 1000;

/// Header carrying the bearer token.
pub const AUTH_TOKEN_HEADER: &str = "Auth-Token";

/// Route templates; `{id}` is replaced by the account id.
pub mod routes {
    pub const TOKENS: &str = "v1/tokens";
    pub const ACCOUNTS: &str = "v1/accounts";
    pub const ACCOUNT: &str = "v1/accounts/{id}";
    pub const KEYS: &str = "v1/accounts/{id}/keys";
    pub const LOGS: &str = "v1/accounts/{id}/logs";

    /// Substitutes `account_id` into `template`.
    pub fn expand(template: &str, account_id: &str) -> String {
        template.replace("{id}", account_id)
    }
}

/// Settings for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base address, e.g. `https://test.blitzlog.com:8080`.
    pub address: String,
    /// Status every successful call must return.
    pub expected_status: StatusCode,
    /// Page size sent with every log query.
    pub page_size: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_API_ADDRESS.to_string(),
            expected_status: StatusCode::OK,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ClientConfig {
    pub fn with_address(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }
}

/// Caller supplied part of a log query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    pub filter: Option<String>,
    pub start_ms: Option<i64>,
    pub end_ms: Option<i64>,
}

/// Client for the blitzlog API.
#[derive(Clone)]
pub struct ApiClient<T = HttpTransport> {
    transport: T,
    config: ClientConfig,
}

impl ApiClient<HttpTransport> {
    /// Creates a client backed by a blocking reqwest transport.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self::with_transport(config, HttpTransport::new()?))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { transport, config }
    }

    /// Exchanges a token from an external identity provider for an API token.
    pub fn create_token(&self, external_token: &str, provider: &str) -> Result<CreateTokenResponse> {
        let req = CreateTokenRequest {
            external_token: external_token.to_string(),
            provider: provider.to_string(),
        };
        self.call(Method::POST, routes::TOKENS.to_string(), "", Some(&req))
    }

    pub fn create_individual_account(&self, token: &str) -> Result<CreateAccountResponse> {
        let req = CreateAccountRequest {
            account_type: AccountType::Individual,
            name: None,
        };
        self.call(Method::POST, routes::ACCOUNTS.to_string(), token, Some(&req))
    }

    pub fn create_org_account(&self, name: &str, token: &str) -> Result<CreateOrgResponse> {
        let req = CreateAccountRequest {
            account_type: AccountType::Organization,
            name: Some(name.to_string()),
        };
        self.call(Method::POST, routes::ACCOUNTS.to_string(), token, Some(&req))
    }

    pub fn get_account(&self, account_id: &str, token: &str) -> Result<GetAccountResponse> {
        let route = routes::expand(routes::ACCOUNT, account_id);
        self.call::<(), _>(Method::GET, route, token, None)
    }

    pub fn create_key(&self, account_id: &str, token: &str) -> Result<CreateKeyResponse> {
        let route = routes::expand(routes::KEYS, account_id);
        self.call(Method::POST, route, token, Some(&CreateKeyRequest {}))
    }

    pub fn get_keys(&self, account_id: &str, token: &str) -> Result<GetKeysResponse> {
        let route = routes::expand(routes::KEYS, account_id);
        self.call::<(), _>(Method::GET, route, token, None)
    }

    /// Fetches one page of logs. The page size always comes from the client
    /// config, not from the caller.
    pub fn get_logs(&self, account_id: &str, token: &str, filter: &LogFilter) -> Result<GetLogsResponse> {
        let route = routes::expand(routes::LOGS, account_id);
        let req = GetLogsRequest {
            query: LogQuery {
                filter: filter.filter.clone().filter(|f| !f.is_empty()),
                start_ms: filter.start_ms,
                end_ms: filter.end_ms,
                page: QueryPage {
                    size: self.config.page_size,
                },
            },
        };
        self.call(Method::POST, route, token, Some(&req))
    }

    fn url(&self, route: &str) -> String {
        format!(
            "{}/{}",
            self.config.address.trim_end_matches('/'),
            route.trim_start_matches('/')
        )
    }

    fn call<B, R>(&self, method: Method, route: String, token: &str, body: Option<&B>) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(Error::Serialization)?;

        let request = ApiRequest {
            method,
            url: self.url(&route),
            headers: vec![
                ("Content-Type", "application/json".to_string()),
                (AUTH_TOKEN_HEADER, token.to_string()),
            ],
            body,
        };
        debug!(method = %request.method, url = %request.url, "sending api request");

        let response = self.transport.send(request)?;
        debug!(status = %response.status, bytes = response.body.len(), "received api response");

        if response.status != self.config.expected_status {
            return Err(Error::UnexpectedStatus {
                status: response.status,
                body: String::from_utf8_lossy(&response.body).into_owned(),
            });
        }

        serde_json::from_slice(&response.body).map_err(Error::Deserialization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::cell::RefCell;

    /// Transport answering every request with a canned response.
    struct MockTransport {
        status: StatusCode,
        body: String,
        sent: RefCell<Vec<ApiRequest>>,
    }

    impl MockTransport {
        fn new(status: StatusCode, body: impl Into<String>) -> Self {
            Self {
                status,
                body: body.into(),
                sent: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for &MockTransport {
        fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
            self.sent.borrow_mut().push(request);
            Ok(ApiResponse {
                status: self.status,
                body: self.body.clone().into_bytes(),
            })
        }
    }

    fn client(mock: &MockTransport) -> ApiClient<&MockTransport> {
        ApiClient::with_transport(ClientConfig::with_address("http://api.test"), mock)
    }

    fn sent_json(mock: &MockTransport) -> Value {
        let sent = mock.sent.borrow();
        serde_json::from_slice(sent[0].body.as_deref().unwrap()).unwrap()
    }

    #[test]
    fn route_expansion() {
        assert_eq!(routes::expand(routes::KEYS, "abc123"), "v1/accounts/abc123/keys");
        assert_eq!(routes::expand(routes::ACCOUNT, "abc123"), "v1/accounts/abc123");
        assert_eq!(routes::expand(routes::TOKENS, "abc123"), "v1/tokens");
    }

    #[test]
    fn url_joins_without_double_slash() {
        let mock = MockTransport::new(StatusCode::OK, "{}");
        let c = ApiClient::with_transport(ClientConfig::with_address("http://api.test/"), &mock);
        c.get_keys("abc123", "tok").unwrap();
        assert_eq!(mock.sent.borrow()[0].url, "http://api.test/v1/accounts/abc123/keys");
    }

    #[test]
    fn envelope_headers_are_set() {
        let mock = MockTransport::new(StatusCode::OK, "{}");
        client(&mock).get_account("abc123", "tok-9").unwrap();

        let sent = mock.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, Method::GET);
        assert_eq!(sent[0].header("content-type"), Some("application/json"));
        assert_eq!(sent[0].header("auth-token"), Some("tok-9"));
        assert!(sent[0].body.is_none());
    }

    #[test]
    fn create_token() {
        let mock = MockTransport::new(StatusCode::OK, r#"{"token":"api-tok","account_id":"abc"}"#);
        let resp = client(&mock).create_token("gh-tok", "github").unwrap();

        assert_eq!(resp.token, "api-tok");
        assert_eq!(resp.account_id.as_deref(), Some("abc"));
        assert_eq!(mock.sent.borrow()[0].url, "http://api.test/v1/tokens");
        assert_eq!(
            sent_json(&mock),
            json!({"external_token": "gh-tok", "provider": "github"})
        );
    }

    #[test]
    fn create_individual_account() {
        let mock = MockTransport::new(
            StatusCode::OK,
            r#"{"account":{"id":"abc","type":"individual"}}"#,
        );
        let resp = client(&mock).create_individual_account("tok").unwrap();

        assert_eq!(resp.account.id, "abc");
        assert_eq!(resp.account.account_type, "individual");
        assert_eq!(mock.sent.borrow()[0].method, Method::POST);
        assert_eq!(sent_json(&mock), json!({"type": "individual"}));
    }

    #[test]
    fn create_org_account() {
        let mock = MockTransport::new(
            StatusCode::OK,
            r#"{"account":{"id":"org1","type":"organization","name":"acme"}}"#,
        );
        let resp = client(&mock).create_org_account("acme", "tok").unwrap();

        assert_eq!(resp.account.name.as_deref(), Some("acme"));
        assert_eq!(mock.sent.borrow()[0].url, "http://api.test/v1/accounts");
        assert_eq!(sent_json(&mock), json!({"type": "organization", "name": "acme"}));
    }

    #[test]
    fn get_account() {
        let mock = MockTransport::new(
            StatusCode::OK,
            r#"{"account":{"id":"abc123","type":"individual","created_at":"2024-01-01"}}"#,
        );
        let resp = client(&mock).get_account("abc123", "tok").unwrap();

        assert_eq!(resp.account.id, "abc123");
        assert_eq!(resp.account.created_at.as_deref(), Some("2024-01-01"));
        assert_eq!(mock.sent.borrow()[0].url, "http://api.test/v1/accounts/abc123");
    }

    #[test]
    fn create_key() {
        let mock = MockTransport::new(StatusCode::OK, r#"{"key":{"id":"k1","secret":"xyz"}}"#);
        let resp = client(&mock).create_key("abc123", "tok").unwrap();

        assert_eq!(resp.key.id, "k1");
        assert_eq!(resp.key.secret.as_deref(), Some("xyz"));
        assert_eq!(mock.sent.borrow()[0].method, Method::POST);
        assert_eq!(mock.sent.borrow()[0].url, "http://api.test/v1/accounts/abc123/keys");
        assert_eq!(sent_json(&mock), json!({}));
    }

    #[test]
    fn get_keys() {
        let mock = MockTransport::new(StatusCode::OK, r#"{"keys":[{"id":"k1"},{"id":"k2"}]}"#);
        let resp = client(&mock).get_keys("abc123", "tok").unwrap();

        let ids: Vec<_> = resp.keys.iter().map(|k| k.id.as_str()).collect();
        assert_eq!(ids, ["k1", "k2"]);
        assert_eq!(mock.sent.borrow()[0].method, Method::GET);
    }

    #[test]
    fn get_logs_default_query_is_page_only() {
        let mock = MockTransport::new(
            StatusCode::OK,
            r#"{"logs":[{"timestamp":1,"level":"info","message":"hello"}]}"#,
        );
        let resp = client(&mock)
            .get_logs("abc123", "tok", &LogFilter::default())
            .unwrap();

        assert_eq!(resp.logs.len(), 1);
        assert_eq!(resp.logs[0].message, "hello");
        assert_eq!(mock.sent.borrow()[0].url, "http://api.test/v1/accounts/abc123/logs");
        assert_eq!(sent_json(&mock), json!({"query": {"page": {"size": 1000}}}));
    }

    #[test]
    fn get_logs_sends_filter_and_range() {
        let mock = MockTransport::new(StatusCode::OK, r#"{"logs":[]}"#);
        let filter = LogFilter {
            filter: Some("level:error".into()),
            start_ms: Some(10),
            end_ms: Some(20),
        };
        client(&mock).get_logs("abc123", "tok", &filter).unwrap();

        assert_eq!(
            sent_json(&mock),
            json!({"query": {
                "filter": "level:error",
                "start_ms": 10,
                "end_ms": 20,
                "page": {"size": 1000}
            }})
        );
    }

    #[test]
    fn get_logs_uses_configured_page_size() {
        let mock = MockTransport::new(StatusCode::OK, r#"{"logs":[]}"#);
        let config = ClientConfig {
            page_size: 50,
            ..ClientConfig::with_address("http://api.test")
        };
        ApiClient::with_transport(config, &mock)
            .get_logs("abc123", "tok", &LogFilter::default())
            .unwrap();

        assert_eq!(sent_json(&mock)["query"]["page"]["size"], 50);
    }

    #[test]
    fn non_ok_status_is_unexpected_status_for_every_method() {
        let mock = MockTransport::new(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        let c = client(&mock);

        let errors = vec![
            c.create_token("x", "github").map(|_| ()).unwrap_err(),
            c.create_individual_account("tok").map(|_| ()).unwrap_err(),
            c.create_org_account("acme", "tok").map(|_| ()).unwrap_err(),
            c.get_account("abc", "tok").map(|_| ()).unwrap_err(),
            c.create_key("abc", "tok").map(|_| ()).unwrap_err(),
            c.get_keys("abc", "tok").map(|_| ()).unwrap_err(),
            c.get_logs("abc", "tok", &LogFilter::default()).map(|_| ()).unwrap_err(),
        ];

        for err in errors {
            match err {
                Error::UnexpectedStatus { status, body } => {
                    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                    assert_eq!(body, "boom");
                }
                other => panic!("expected UnexpectedStatus, got {other:?}"),
            }
        }
        assert_eq!(mock.sent.borrow().len(), 7);
    }

    #[test]
    fn other_success_codes_are_rejected() {
        let mock = MockTransport::new(StatusCode::CREATED, r#"{"key":{"id":"k1"}}"#);
        let err = client(&mock).create_key("abc", "tok").unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::CREATED));
    }

    #[test]
    fn expected_status_is_configurable() {
        let mock = MockTransport::new(StatusCode::CREATED, r#"{"key":{"id":"k1"}}"#);
        let config = ClientConfig {
            expected_status: StatusCode::CREATED,
            ..ClientConfig::with_address("http://api.test")
        };
        let resp = ApiClient::with_transport(config, &mock)
            .create_key("abc", "tok")
            .unwrap();
        assert_eq!(resp.key.id, "k1");
    }

    #[test]
    fn invalid_body_is_deserialization_error() {
        let mock = MockTransport::new(StatusCode::OK, "not json");
        let err = client(&mock).get_keys("abc", "tok").unwrap_err();
        assert!(matches!(err, Error::Deserialization(_)));
    }

    #[test]
    fn transport_errors_pass_through() {
        struct Failing;
        impl Transport for Failing {
            fn send(&self, _: ApiRequest) -> Result<ApiResponse> {
                Err(Error::Io("body truncated".into()))
            }
        }

        let c = ApiClient::with_transport(ClientConfig::default(), Failing);
        let err = c.get_keys("abc", "tok").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
