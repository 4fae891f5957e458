//! Transport seam between the typed API client and the network.
//!
//! # Design
//! - Requests are plain data so middleware (auth) can inspect and rewrite them.
//! - Paths are relative to the API base URL (`/content/popular`), never absolute.
//! - Futures are `!Send`; the browser runtime is single-threaded.

use std::rc::Rc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Header carrying the bearer credential.
pub const AUTHORIZATION: &str = "Authorization";

const AUTH_PREFIX: &str = "/auth/";

/// HTTP methods used by the catalog API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `DELETE`
    Delete,
}

impl Method {
    /// Upper-case method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

/// Outgoing API request.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the API base URL.
    pub path: String,
    /// Query parameters in insertion order (unencoded).
    pub query: Vec<(String, String)>,
    /// Optional JSON body.
    pub body: Option<Value>,
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    /// Build a request without query, body or headers.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: Vec::new(),
        }
    }

    /// `GET path`
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// `POST path`
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// `DELETE path`
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Value of a header, compared case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Set a header, replacing any existing value.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.remove_header(name);
        self.headers.push((name.to_string(), value.into()));
    }

    /// Drop a header if present.
    pub fn remove_header(&mut self, name: &str) {
        self.headers.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
    }

    /// Whether this targets the login/register/email-check endpoints.
    #[must_use]
    pub fn is_auth_endpoint(&self) -> bool {
        self.path.starts_with(AUTH_PREFIX)
    }

    /// Absolute URL with an encoded query string.
    #[must_use]
    pub fn url(&self, base_url: &str) -> String {
        let mut url = format!("{}{}", base_url.trim_end_matches('/'), self.path);
        for (index, (key, value)) in self.query.iter().enumerate() {
            url.push(if index == 0 { '?' } else { '&' });
            url.push_str(&urlencoding::encode(key));
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }
}

/// Raw API response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text (JSON for this API).
    pub body: String,
}

impl ApiResponse {
    /// Build a response.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// The request never produced a response (offline, CORS, DNS, aborted).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("network request failed: {0}")]
pub struct TransportError(pub String);

/// Sends API requests.
#[async_trait(?Send)]
pub trait Transport {
    /// Send one request and return whatever response the server produced.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] only when no HTTP response was received.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

#[async_trait(?Send)]
impl<T: Transport + ?Sized> Transport for Rc<T> {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        (**self).send(request).await
    }
}
