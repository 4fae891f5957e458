//! Typed client for the catalog REST API.

use std::fmt;
use std::rc::Rc;

use cinevault_api_models::{
    AuthResponse, Content, Episode, ErrorResponse, Genre, LoginRequest, Page, RegisterRequest,
};
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use crate::services::transport::{ApiRequest, ApiResponse, Transport, TransportError};

/// Failure of a single API call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No response was received.
    #[error("network request failed: {0}")]
    Network(String),
    /// The server answered with a non-2xx status.
    #[error("request failed with status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// `ErrorResponse.message` from the body, when present.
        message: Option<String>,
    },
    /// A 2xx body did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),
    /// The call needs a signed-in user and none is present; nothing was sent.
    #[error("no signed-in user")]
    Unauthenticated,
}

impl ApiError {
    /// HTTP status for server-side failures.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Network(_) | Self::Decode(_) | Self::Unauthenticated => None,
        }
    }

    /// Display message supplied by the server.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            Self::Network(_) | Self::Decode(_) | Self::Unauthenticated => None,
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(value: TransportError) -> Self {
        Self::Network(value.0)
    }
}

/// Zero-based page index and fixed page size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PageRequest {
    /// Zero-based page index.
    pub page: u32,
    /// Items per page.
    pub size: u32,
}

impl PageRequest {
    /// Build a page request.
    #[must_use]
    pub const fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    fn apply(self, request: ApiRequest) -> ApiRequest {
        request.query("page", self.page).query("size", self.size)
    }
}

/// Catalog API client. Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct ApiClient {
    transport: Rc<dyn Transport>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient").finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Wrap a transport (usually the auth interceptor).
    #[must_use]
    pub fn new(transport: Rc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let response = self.transport.send(request).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(classify(&response))
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let response = self.execute(request).await?;
        serde_json::from_str(&response.body).map_err(|err| ApiError::Decode(err.to_string()))
    }

    async fn fetch_items<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        page: PageRequest,
    ) -> Result<Page<T>, ApiError> {
        self.fetch(page.apply(request)).await
    }

    // ── auth ────────────────────────────────────────────────────────────────

    /// `POST /auth/login`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-2xx status or bad body.
    pub async fn login(&self, body: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let body = serde_json::to_value(body).map_err(|err| ApiError::Decode(err.to_string()))?;
        self.fetch(ApiRequest::post("/auth/login").json(body)).await
    }

    /// `POST /auth/register`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-2xx status or bad body.
    pub async fn register(&self, body: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let body = serde_json::to_value(body).map_err(|err| ApiError::Decode(err.to_string()))?;
        self.fetch(ApiRequest::post("/auth/register").json(body))
            .await
    }

    /// `GET /auth/check-email`; `true` when an account already uses `email`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-2xx status or bad body.
    pub async fn email_exists(&self, email: &str) -> Result<bool, ApiError> {
        self.fetch(ApiRequest::get("/auth/check-email").query("email", email))
            .await
    }

    // ── content ─────────────────────────────────────────────────────────────

    /// `GET /content/popular`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-2xx status or bad body.
    pub async fn popular(&self, page: PageRequest) -> Result<Page<Content>, ApiError> {
        self.fetch_items(ApiRequest::get("/content/popular"), page)
            .await
    }

    /// `GET /content/recent`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-2xx status or bad body.
    pub async fn recent(&self, page: PageRequest) -> Result<Page<Content>, ApiError> {
        self.fetch_items(ApiRequest::get("/content/recent"), page)
            .await
    }

    /// `GET /content/available`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-2xx status or bad body.
    pub async fn available(&self, page: PageRequest) -> Result<Page<Content>, ApiError> {
        self.fetch_items(ApiRequest::get("/content/available"), page)
            .await
    }

    /// `GET /content/search?title=`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-2xx status or bad body.
    pub async fn search(&self, title: &str, page: PageRequest) -> Result<Page<Content>, ApiError> {
        self.fetch_items(ApiRequest::get("/content/search").query("title", title), page)
            .await
    }

    /// `GET /content/by-type?type=`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-2xx status or bad body.
    pub async fn by_type(&self, kind: &str, page: PageRequest) -> Result<Page<Content>, ApiError> {
        self.fetch_items(ApiRequest::get("/content/by-type").query("type", kind), page)
            .await
    }

    /// `GET /content/by-genre?genre=`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-2xx status or bad body.
    pub async fn by_genre(&self, genre: &str, page: PageRequest) -> Result<Page<Content>, ApiError> {
        self.fetch_items(ApiRequest::get("/content/by-genre").query("genre", genre), page)
            .await
    }

    /// `GET /content/filter?by-type=&by-genre=`; absent filters are omitted.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-2xx status or bad body.
    pub async fn filter(
        &self,
        kind: Option<&str>,
        genre: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Content>, ApiError> {
        let mut request = ApiRequest::get("/content/filter");
        if let Some(kind) = kind {
            request = request.query("by-type", kind);
        }
        if let Some(genre) = genre {
            request = request.query("by-genre", genre);
        }
        self.fetch_items(request, page).await
    }

    /// `GET /content/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-2xx status or bad body.
    pub async fn content(&self, id: Uuid) -> Result<Content, ApiError> {
        self.fetch(ApiRequest::get(format!("/content/{id}"))).await
    }

    // ── episodes ────────────────────────────────────────────────────────────

    /// `GET /episodes/by-content/{id}/seasons`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-2xx status or bad body.
    pub async fn seasons(&self, content_id: Uuid) -> Result<Vec<u32>, ApiError> {
        self.fetch(ApiRequest::get(format!(
            "/episodes/by-content/{content_id}/seasons"
        )))
        .await
    }

    /// `GET /episodes/by-content/{id}/season/{n}`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-2xx status or bad body.
    pub async fn episodes(
        &self,
        content_id: Uuid,
        season: u32,
        page: PageRequest,
    ) -> Result<Page<Episode>, ApiError> {
        self.fetch_items(
            ApiRequest::get(format!("/episodes/by-content/{content_id}/season/{season}")),
            page,
        )
        .await
    }

    /// `GET /episodes/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-2xx status or bad body.
    pub async fn episode(&self, id: Uuid) -> Result<Episode, ApiError> {
        self.fetch(ApiRequest::get(format!("/episodes/{id}"))).await
    }

    // ── genres ──────────────────────────────────────────────────────────────

    /// `GET /genres`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-2xx status or bad body.
    pub async fn genres(&self, page: PageRequest) -> Result<Page<Genre>, ApiError> {
        self.fetch_items(ApiRequest::get("/genres"), page).await
    }

    /// `GET /genres/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-2xx status or bad body.
    pub async fn genre(&self, id: Uuid) -> Result<Genre, ApiError> {
        self.fetch(ApiRequest::get(format!("/genres/{id}"))).await
    }

    /// `GET /genres/by-name/{name}`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-2xx status or bad body.
    pub async fn genre_by_name(&self, name: &str) -> Result<Genre, ApiError> {
        let name = urlencoding::encode(name);
        self.fetch(ApiRequest::get(format!("/genres/by-name/{name}")))
            .await
    }

    /// `GET /genres/search?name=`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-2xx status or bad body.
    pub async fn search_genres(&self, name: &str, page: PageRequest) -> Result<Page<Genre>, ApiError> {
        self.fetch_items(ApiRequest::get("/genres/search").query("name", name), page)
            .await
    }

    // ── watchlist ───────────────────────────────────────────────────────────

    /// `GET /watchlist?userId=`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-2xx status or bad body.
    pub async fn watchlist(&self, user_id: Uuid, page: PageRequest) -> Result<Page<Content>, ApiError> {
        self.fetch_items(ApiRequest::get("/watchlist").query("userId", user_id), page)
            .await
    }

    /// `POST /watchlist?userId=&contentId=`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or non-2xx status.
    pub async fn add_to_watchlist(&self, user_id: Uuid, content_id: Uuid) -> Result<(), ApiError> {
        self.execute(watchlist_entry(ApiRequest::post("/watchlist"), user_id, content_id))
            .await
            .map(drop)
    }

    /// `DELETE /watchlist?userId=&contentId=`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or non-2xx status.
    pub async fn remove_from_watchlist(
        &self,
        user_id: Uuid,
        content_id: Uuid,
    ) -> Result<(), ApiError> {
        self.execute(watchlist_entry(ApiRequest::delete("/watchlist"), user_id, content_id))
            .await
            .map(drop)
    }

    /// `GET /watchlist/check?userId=&contentId=`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-2xx status or bad body.
    pub async fn in_watchlist(&self, user_id: Uuid, content_id: Uuid) -> Result<bool, ApiError> {
        self.fetch(watchlist_entry(
            ApiRequest::get("/watchlist/check"),
            user_id,
            content_id,
        ))
        .await
    }
}

fn watchlist_entry(request: ApiRequest, user_id: Uuid, content_id: Uuid) -> ApiRequest {
    request
        .query("userId", user_id)
        .query("contentId", content_id)
}

fn classify(response: &ApiResponse) -> ApiError {
    let message = serde_json::from_str::<ErrorResponse>(&response.body)
        .ok()
        .and_then(|body| body.display_message().map(str::to_string));
    ApiError::Status {
        status: response.status,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::transport::Method;
    use crate::testing::{FakeTransport, content_json, page_json};

    #[tokio::test]
    async fn list_calls_send_page_and_size() -> Result<(), ApiError> {
        let transport = FakeTransport::new();
        transport.respond(
            Method::Get,
            "/content/by-genre",
            200,
            page_json(vec![content_json("Heat")], 1, 3, 6),
        );
        let client = ApiClient::new(transport.clone());

        let page = client.by_genre("Action", PageRequest::new(1, 6)).await?;

        assert_eq!(page.content[0].title, "Heat");
        let sent = transport.requests();
        assert_eq!(
            sent[0].query,
            vec![
                ("genre".to_string(), "Action".to_string()),
                ("page".to_string(), "1".to_string()),
                ("size".to_string(), "6".to_string()),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn error_body_message_is_surfaced() {
        let transport = FakeTransport::new();
        transport.respond(
            Method::Post,
            "/watchlist",
            409,
            r#"{"status":409,"error":"Conflict","message":"Content already in watchlist"}"#,
        );
        let client = ApiClient::new(transport);

        let err = client
            .add_to_watchlist(Uuid::new_v4(), Uuid::new_v4())
            .await
            .err();

        assert_eq!(
            err,
            Some(ApiError::Status {
                status: 409,
                message: Some("Content already in watchlist".to_string()),
            })
        );
    }

    #[tokio::test]
    async fn non_json_error_body_has_no_message() {
        let transport = FakeTransport::new();
        transport.respond(Method::Get, "/genres", 502, "<html>bad gateway</html>");
        let client = ApiClient::new(transport);

        let err = client.genres(PageRequest::new(0, 20)).await.err();

        assert_eq!(err.as_ref().and_then(ApiError::status), Some(502));
        assert_eq!(err.as_ref().and_then(ApiError::server_message), None);
    }

    #[tokio::test]
    async fn offline_transport_maps_to_network_error() {
        let transport = FakeTransport::new();
        transport.go_offline();
        let client = ApiClient::new(transport);

        let err = client.popular(PageRequest::new(0, 6)).await.err();

        assert!(matches!(err, Some(ApiError::Network(_))));
    }

    #[tokio::test]
    async fn filter_omits_absent_parameters_and_encodes_names() -> Result<(), ApiError> {
        let transport = FakeTransport::new();
        transport.respond(Method::Get, "/content/filter", 200, page_json(vec![], 0, 0, 6));
        transport.respond(
            Method::Get,
            "/genres/by-name/Science%20Fiction",
            200,
            r#"{"id":"0b7f5a8e-8a38-4a53-8a59-1c8f3a5b7d21","name":"Science Fiction"}"#,
        );
        let client = ApiClient::new(transport.clone());

        client
            .filter(Some("TV Show"), None, PageRequest::new(0, 6))
            .await?;
        let genre = client.genre_by_name("Science Fiction").await?;

        assert_eq!(genre.name, "Science Fiction");
        let sent = transport.requests();
        assert_eq!(sent[0].query[0], ("by-type".to_string(), "TV Show".to_string()));
        assert!(sent[0].query.iter().all(|(key, _)| key != "by-genre"));
        Ok(())
    }
}
