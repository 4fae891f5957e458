//! Title detail: content record, seasons and the episodes of one season.
//!
//! # Design
//! - One episode feed serves every season; picking a season reloads it from page zero.
//! - Titles without seasons (movies) leave the episode feed empty.

use std::cell::Cell;
use std::rc::Rc;

use cinevault_api_models::{Content, Page};
use uuid::Uuid;

use crate::core::feed::{FeedError, LoadOutcome, PaginatedFeed};
use crate::core::store::StateCell;
use crate::models::Item;
use crate::services::api::ApiClient;

/// State behind `/content/{id}` and `/show/{id}`.
#[derive(Debug)]
pub struct ShowDetail {
    content_id: Uuid,
    api: ApiClient,
    content: StateCell<Option<Content>>,
    seasons: StateCell<Vec<u32>>,
    season: Rc<Cell<Option<u32>>>,
    /// Episodes of the selected season.
    pub episodes: PaginatedFeed<Item>,
}

impl ShowDetail {
    /// Detail state for `content_id`; nothing is fetched yet.
    #[must_use]
    pub fn new(api: &ApiClient, content_id: Uuid, page_size: u32) -> Self {
        let season = Rc::new(Cell::new(None::<u32>));
        let episodes = PaginatedFeed::new(page_size, {
            let api = api.clone();
            let season = Rc::clone(&season);
            move |request| {
                let api = api.clone();
                let selected = season.get();
                async move {
                    match selected {
                        Some(number) => api
                            .episodes(content_id, number, request)
                            .await
                            .map(|page| page.map(Item::Episode)),
                        None => Ok(Page::empty(request.size)),
                    }
                }
            }
        });
        Self {
            content_id,
            api: api.clone(),
            content: StateCell::new(None),
            seasons: StateCell::new(Vec::new()),
            season,
            episodes,
        }
    }

    /// Identifier of the title.
    #[must_use]
    pub const fn content_id(&self) -> Uuid {
        self.content_id
    }

    /// Loaded content record.
    #[must_use]
    pub fn content(&self) -> Option<Content> {
        self.content.get()
    }

    /// Season numbers in ascending order.
    #[must_use]
    pub fn seasons(&self) -> Vec<u32> {
        self.seasons.get()
    }

    /// Selected season.
    #[must_use]
    pub fn selected_season(&self) -> Option<u32> {
        self.season.get()
    }

    /// Fetch the record and season list, then open the first season.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError`] when the record, seasons or first episode page fail.
    pub async fn load(&self) -> Result<(), FeedError> {
        let (content, seasons) = futures_util::join!(
            self.api.content(self.content_id),
            self.api.seasons(self.content_id)
        );
        self.content.set(Some(content?));
        let mut seasons = seasons?;
        seasons.sort_unstable();
        seasons.dedup();
        let first = seasons.first().copied();
        self.seasons.set(seasons);
        if let Some(number) = first {
            self.select_season(number).await?;
        }
        Ok(())
    }

    /// Switch the episode feed to `season`.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError`] when the first page of the season fails.
    pub async fn select_season(&self, season: u32) -> Result<LoadOutcome, FeedError> {
        self.season.set(Some(season));
        self.episodes.load(0).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::transport::Method;
    use crate::testing::{FakeTransport, content_json, episode_json, page_json};

    #[tokio::test]
    async fn opens_first_season_after_loading() -> Result<(), FeedError> {
        let transport = FakeTransport::new();
        let id = Uuid::new_v4();
        let mut record = content_json("Dark");
        record["id"] = serde_json::json!(id);
        transport.respond(Method::Get, &format!("/content/{id}"), 200, record.to_string());
        transport.respond(
            Method::Get,
            &format!("/episodes/by-content/{id}/seasons"),
            200,
            "[3, 1, 2, 1]",
        );
        transport.respond(
            Method::Get,
            &format!("/episodes/by-content/{id}/season/1"),
            200,
            page_json(vec![episode_json(id, 1, 1), episode_json(id, 1, 2)], 0, 1, 10),
        );
        let detail = ShowDetail::new(&ApiClient::new(transport.clone()), id, 10);

        detail.load().await?;

        assert_eq!(detail.content().map(|content| content.title), Some("Dark".into()));
        assert_eq!(detail.seasons(), vec![1, 2, 3]);
        assert_eq!(detail.selected_season(), Some(1));
        let episodes = detail.episodes.state().items;
        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[1].episode_label().as_deref(), Some("S1 · E2"));
        Ok(())
    }

    #[tokio::test]
    async fn movie_without_seasons_has_no_episodes() -> Result<(), FeedError> {
        let transport = FakeTransport::new();
        let id = Uuid::new_v4();
        transport.respond(
            Method::Get,
            &format!("/content/{id}"),
            200,
            content_json("Heat").to_string(),
        );
        transport.respond(
            Method::Get,
            &format!("/episodes/by-content/{id}/seasons"),
            200,
            "[]",
        );
        let detail = ShowDetail::new(&ApiClient::new(transport.clone()), id, 10);

        detail.load().await?;

        assert_eq!(detail.selected_season(), None);
        assert!(detail.episodes.state().items.is_empty());
        assert_eq!(transport.requests().len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn missing_title_is_reported() {
        let transport = FakeTransport::new();
        let detail = ShowDetail::new(&ApiClient::new(transport), Uuid::new_v4(), 10);

        let err = detail.load().await.err();

        assert!(matches!(err, Some(FeedError::Server { status: 404, .. })));
        assert_eq!(detail.content(), None);
    }
}
