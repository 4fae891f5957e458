//! Watchlist add/remove on behalf of the signed-in user.
//!
//! No membership is cached here; every check goes to the backend and the watchlist
//! feed is reloaded after a removal.

use std::fmt;
use std::rc::Rc;

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::feed::PaginatedFeed;
use crate::core::session::SessionManager;
use crate::services::api::{ApiClient, ApiError};

const UNAUTHENTICATED: &str = "Please log in to manage your watchlist";
const NETWORK: &str = "Unable to reach the server. Please try again.";
const SERVER: &str = "Unable to update your watchlist";

/// Failure of a watchlist mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WatchlistError {
    /// No signed-in user; nothing was sent.
    #[error("no authenticated user")]
    Unauthenticated,
    /// No usable response.
    #[error("watchlist request failed: {0}")]
    Network(String),
    /// The server rejected the change.
    #[error("{message}")]
    ServerMessage {
        /// HTTP status code.
        status: u16,
        /// Server message, or a generic fallback.
        message: String,
    },
}

impl WatchlistError {
    /// Message suitable for a toast.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Unauthenticated => UNAUTHENTICATED,
            Self::Network(_) => NETWORK,
            Self::ServerMessage { message, .. } => message,
        }
    }
}

impl From<ApiError> for WatchlistError {
    fn from(value: ApiError) -> Self {
        match value {
            ApiError::Status { status, message } => Self::ServerMessage {
                status,
                message: message.unwrap_or_else(|| SERVER.to_string()),
            },
            ApiError::Network(detail) | ApiError::Decode(detail) => Self::Network(detail),
            ApiError::Unauthenticated => Self::Unauthenticated,
        }
    }
}

/// Adds and removes watchlist entries for the acting user.
#[derive(Clone)]
pub struct WatchlistMutator {
    api: ApiClient,
    session: Rc<SessionManager>,
}

impl fmt::Debug for WatchlistMutator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchlistMutator").finish_non_exhaustive()
    }
}

impl WatchlistMutator {
    /// Mutator acting as the session's user.
    #[must_use]
    pub const fn new(api: ApiClient, session: Rc<SessionManager>) -> Self {
        Self { api, session }
    }

    /// Add `content_id` to the user's watchlist.
    ///
    /// # Errors
    ///
    /// Returns [`WatchlistError::Unauthenticated`] before any request when nobody is
    /// signed in, otherwise the mapped API failure.
    pub async fn add(&self, content_id: Uuid) -> Result<(), WatchlistError> {
        let user_id = self.acting_user()?;
        self.api.add_to_watchlist(user_id, content_id).await?;
        info!(%content_id, "added to watchlist");
        Ok(())
    }

    /// Remove `content_id` from the user's watchlist.
    ///
    /// # Errors
    ///
    /// Same as [`WatchlistMutator::add`].
    pub async fn remove(&self, content_id: Uuid) -> Result<(), WatchlistError> {
        let user_id = self.acting_user()?;
        self.api.remove_from_watchlist(user_id, content_id).await?;
        info!(%content_id, "removed from watchlist");
        Ok(())
    }

    /// Remove `content_id`, then reload `feed` on its current page.
    ///
    /// A failed reload is left on the feed's own error state.
    ///
    /// # Errors
    ///
    /// Same as [`WatchlistMutator::remove`]; the feed is not touched on failure.
    pub async fn remove_and_refresh<I: Clone + 'static>(
        &self,
        content_id: Uuid,
        feed: &PaginatedFeed<I>,
    ) -> Result<(), WatchlistError> {
        self.remove(content_id).await?;
        if let Err(err) = feed.reload().await {
            warn!(error = %err, "watchlist reload failed after removal");
        }
        Ok(())
    }

    /// Fresh membership check.
    ///
    /// # Errors
    ///
    /// Same as [`WatchlistMutator::add`].
    pub async fn contains(&self, content_id: Uuid) -> Result<bool, WatchlistError> {
        let user_id = self.acting_user()?;
        Ok(self.api.in_watchlist(user_id, content_id).await?)
    }

    fn acting_user(&self) -> Result<Uuid, WatchlistError> {
        self.session
            .current_user()
            .map(|user| user.id)
            .filter(|id| !id.is_nil())
            .ok_or(WatchlistError::Unauthenticated)
    }
}
