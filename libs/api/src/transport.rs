//! Request/response transport.
//!
//! [`Transport`] is the seam between the typed client and the network. The
//! HTTP implementation keeps one `reqwest::Client` (connection pool and
//! session cookie) that is safe to share across concurrent workflows.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use tracing::debug;

use crate::error::TransportError;

/// Path of the session login endpoint.
pub const LOGIN_PATH: &str = "login";

/// Default per-request timeout for the HTTP transport.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Generic authenticated request/response exchange.
///
/// `path` is relative to the API base and may carry a query string. Retries
/// for connection-level failures belong to implementations, not callers.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Bytes, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Bytes, TransportError> {
        (**self).send(method, path, body).await
    }
}

/// Username/password pair used to open a session.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// HTTP transport against the REST API.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for `base_url` (e.g. `https://host/api/v3`).
    ///
    /// `tls_insecure` disables certificate and hostname verification.
    pub fn new(base_url: impl Into<String>, tls_insecure: bool) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .danger_accept_invalid_certs(tls_insecure)
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a URL for a relative path.
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Open a session; the session cookie is reused by later requests.
    pub async fn login(&self, credentials: &Credentials) -> Result<(), TransportError> {
        debug!(username = %credentials.username, "Opening API session");

        let response = self
            .client
            .post(self.url(LOGIN_PATH))
            .form(&[
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .await?;

        handle_response(LOGIN_PATH, response).await.map(|_| ())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Bytes, TransportError> {
        debug!(method = %method, path, "Sending API request");

        let mut request = self.client.request(method, self.url(path));
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(body);
        }

        let response = request.send().await?;
        handle_response(path, response).await
    }
}

/// Map a response to its body or a typed error.
async fn handle_response(path: &str, response: reqwest::Response) -> Result<Bytes, TransportError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response.bytes().await?);
    }

    debug!(status = %status, path, "API request failed");

    match status {
        StatusCode::NOT_FOUND => Err(TransportError::NotFound {
            path: path.to_string(),
        }),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(TransportError::Unauthorized {
            status: status.as_u16(),
            path: path.to_string(),
        }),
        _ => Err(TransportError::Status {
            status: status.as_u16(),
            path: path.to_string(),
            body: response.text().await.unwrap_or_default(),
        }),
    }
}
