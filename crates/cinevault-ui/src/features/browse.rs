//! Landing page: popular and recent carousels.

use crate::core::feed::{FeedError, PaginatedFeed};
use crate::features::{content_feed, first_error};
use crate::models::Item;
use crate::services::api::ApiClient;

/// Feeds behind the browse page.
#[derive(Debug)]
pub struct BrowseView {
    /// Most-watched titles.
    pub popular: PaginatedFeed<Item>,
    /// Newest titles.
    pub recent: PaginatedFeed<Item>,
}

impl BrowseView {
    /// Build both carousels with `page_size` items each.
    #[must_use]
    pub fn new(api: &ApiClient, page_size: u32) -> Self {
        Self {
            popular: content_feed(api, page_size, |api, page| async move {
                api.popular(page).await
            }),
            recent: content_feed(api, page_size, |api, page| async move {
                api.recent(page).await
            }),
        }
    }

    /// Load the first page of both carousels.
    ///
    /// # Errors
    ///
    /// Returns the first carousel failure; the other carousel still loads.
    pub async fn load(&self) -> Result<(), FeedError> {
        let (popular, recent) = futures_util::join!(self.popular.load(0), self.recent.load(0));
        first_error([popular, recent])
    }
}
