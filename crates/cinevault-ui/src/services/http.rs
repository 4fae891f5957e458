//! Browser transport backed by `gloo-net` (fetch).

use async_trait::async_trait;
use gloo_net::http::Request;

use crate::services::transport::{ApiRequest, ApiResponse, Method, Transport, TransportError};

/// Sends requests with `fetch` against a fixed API base URL.
#[derive(Clone, Debug)]
pub struct GlooTransport {
    base_url: String,
}

impl GlooTransport {
    /// Transport rooted at `base_url` (`http://host:8080/api/v1`).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[async_trait(?Send)]
impl Transport for GlooTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = request.url(&self.base_url);
        let mut req = match request.method {
            Method::Get => Request::get(&url),
            Method::Post => Request::post(&url),
            Method::Delete => Request::delete(&url),
        };
        for (name, value) in &request.headers {
            req = req.header(name, value);
        }
        if let Some(body) = &request.body {
            req = req
                .json(body)
                .map_err(|err| TransportError(err.to_string()))?;
        }

        let response = req
            .send()
            .await
            .map_err(|err| TransportError(err.to_string()))?;
        let status = response.status();
        // An unreadable body still carries a usable status.
        let body = response.text().await.unwrap_or_default();
        Ok(ApiResponse::new(status, body))
    }
}
