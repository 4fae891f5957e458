//! Bearer attachment for outgoing API requests.

use std::fmt;
use std::rc::Rc;

use async_trait::async_trait;
use tracing::warn;

use crate::core::session::SessionManager;
use crate::services::transport::{AUTHORIZATION, ApiRequest, ApiResponse, Transport, TransportError};

/// Transport decorator that owns the `Authorization` header.
///
/// Auth endpoints always go out anonymously. Everything else carries the session's
/// token while it is valid; an expired token ends the session and the request is
/// sent without credentials.
pub struct AuthInterceptor<T> {
    inner: T,
    session: Rc<SessionManager>,
}

impl<T> AuthInterceptor<T> {
    /// Wrap `inner`, reading credentials from `session`.
    #[must_use]
    pub const fn new(inner: T, session: Rc<SessionManager>) -> Self {
        Self { inner, session }
    }

    fn authorize(&self, request: &mut ApiRequest) {
        request.remove_header(AUTHORIZATION);
        if request.is_auth_endpoint() {
            return;
        }
        let Some(token) = self.session.current_token() else {
            return;
        };
        if self.session.is_expired() {
            warn!(path = %request.path, "token expired; signing out");
            self.session.logout();
        } else {
            request.set_header(AUTHORIZATION, format!("Bearer {token}"));
        }
    }
}

impl<T> fmt::Debug for AuthInterceptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthInterceptor").finish_non_exhaustive()
    }
}

#[async_trait(?Send)]
impl<T: Transport> Transport for AuthInterceptor<T> {
    async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.authorize(&mut request);
        self.inner.send(request).await
    }
}
