//! My list page: the signed-in user's watchlist.

use std::rc::Rc;

use uuid::Uuid;

use crate::core::feed::{FeedError, LoadOutcome, PaginatedFeed};
use crate::core::session::SessionManager;
use crate::core::watchlist::{WatchlistError, WatchlistMutator};
use crate::features::content_feed;
use crate::models::Item;
use crate::services::api::{ApiClient, ApiError};

/// Watchlist feed plus the mutator that edits it.
#[derive(Debug)]
pub struct MyListView {
    /// Watchlist entries of the acting user.
    pub feed: PaginatedFeed<Item>,
    watchlist: WatchlistMutator,
}

impl MyListView {
    /// Build the view; the acting user is resolved from `session` on every request.
    #[must_use]
    pub fn new(api: &ApiClient, session: Rc<SessionManager>, page_size: u32) -> Self {
        let watchlist = WatchlistMutator::new(api.clone(), Rc::clone(&session));
        let feed = content_feed(api, page_size, move |api, page| {
            let user = session.current_user();
            async move {
                match user {
                    Some(user) => api.watchlist(user.id, page).await,
                    None => Err(ApiError::Unauthenticated),
                }
            }
        });
        Self { feed, watchlist }
    }

    /// Load the first page.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError`] when the watchlist cannot be fetched.
    pub async fn load(&self) -> Result<LoadOutcome, FeedError> {
        self.feed.load(0).await
    }

    /// Remove an entry and refresh the current page.
    ///
    /// # Errors
    ///
    /// Returns [`WatchlistError`] when the removal fails.
    pub async fn remove(&self, content_id: Uuid) -> Result<(), WatchlistError> {
        self.watchlist
            .remove_and_refresh(content_id, &self.feed)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::transport::Method;
    use crate::testing::{FakeTransport, content_json, page_json, signed_in_session};

    #[tokio::test]
    async fn anonymous_list_reports_login_required() {
        let transport = FakeTransport::new();
        let view = MyListView::new(
            &ApiClient::new(transport.clone()),
            signed_in_session(&transport, None),
            12,
        );

        let err = view.load().await.err();

        assert_eq!(err, Some(FeedError::Unauthenticated));
        let state = view.feed.state();
        assert_eq!(state.error, Some(FeedError::Unauthenticated));
        assert!(!state.loading);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn removing_last_entry_of_last_page_falls_back_a_page() -> Result<(), WatchlistError> {
        let transport = FakeTransport::new();
        let user_id = Uuid::new_v4();
        let view = MyListView::new(
            &ApiClient::new(transport.clone()),
            signed_in_session(&transport, Some(user_id)),
            2,
        );
        transport.respond(
            Method::Get,
            "/watchlist",
            200,
            page_json(vec![content_json("Heat")], 1, 2, 2),
        );
        view.feed
            .load(1)
            .await
            .map_err(|err| WatchlistError::Network(err.to_string()))?;

        transport.respond(Method::Delete, "/watchlist", 204, "");
        // The list shrank to one page; the backend answers page 1 with nothing.
        transport.respond(Method::Get, "/watchlist", 200, page_json(vec![], 1, 1, 2));

        view.remove(Uuid::new_v4()).await?;

        let state = view.feed.state();
        assert_eq!((state.page_index, state.total_pages), (0, 1));
        let pages: Vec<String> = transport
            .requests()
            .iter()
            .filter(|request| request.method == Method::Get)
            .filter_map(|request| {
                request
                    .query
                    .iter()
                    .find(|(key, _)| key == "page")
                    .map(|(_, value)| value.clone())
            })
            .collect();
        assert_eq!(pages, vec!["1", "1", "0"]);
        Ok(())
    }
}
