//! Per-view feed bundles.
//!
//! # Design
//! - Each view owns its feeds; two shelves over the same content type never share state.
//! - Sources tag items at ingestion (`Item::Content` / `Item::Episode`).
//! - Views are DOM-free; rendering binds to their state snapshots and subscriptions.

use std::future::Future;

use cinevault_api_models::{Content, Page};

use crate::core::feed::{FeedError, PaginatedFeed};
use crate::models::Item;
use crate::services::api::{ApiClient, ApiError, PageRequest};

pub mod browse;
pub mod my_list;
pub mod search;
pub mod shelves;
pub mod show_detail;

/// Feed of content records backed by one catalog query.
pub(crate) fn content_feed<F, Fut>(api: &ApiClient, page_size: u32, query: F) -> PaginatedFeed<Item>
where
    F: Fn(ApiClient, PageRequest) -> Fut + 'static,
    Fut: Future<Output = Result<Page<Content>, ApiError>> + 'static,
{
    let api = api.clone();
    PaginatedFeed::new(page_size, move |request| {
        let page = query(api.clone(), request);
        async move { page.await.map(|page| page.map(Item::Content)) }
    })
}

/// First error of a set of concurrently loaded feeds.
pub(crate) fn first_error<T>(
    results: impl IntoIterator<Item = Result<T, FeedError>>,
) -> Result<(), FeedError> {
    results.into_iter().try_for_each(|result| result.map(drop))
}
