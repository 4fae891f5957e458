//! Generic paginated feed state.
//!
//! # Design
//! - One `PaginatedFeed` per query per view; instances share nothing.
//! - Every load takes a fresh generation number. A response is applied only if its
//!   generation is still the newest, so the last load initiated always wins.
//! - Items, page index, totals and the loading flag change in a single update.
//! - A failed load keeps the previous items and records the error once.

use std::cell::Cell;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use cinevault_api_models::Page;
use futures_util::FutureExt as _;
use futures_util::future::LocalBoxFuture;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::store::{StateCell, Subscription};
use crate::services::api::{ApiError, PageRequest};

const NETWORK: &str = "Unable to reach the server. Please try again.";
const SERVER: &str = "Something went wrong while loading. Please try again.";
const UNAUTHENTICATED: &str = "Please log in to see this list";

/// Failure of a single page load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    /// No usable response.
    #[error("feed request failed: {0}")]
    Network(String),
    /// The server rejected the query.
    #[error("feed request failed with status {status}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Server-provided message, when present.
        message: Option<String>,
    },
    /// The query belongs to a signed-in user and nobody is signed in.
    #[error("feed requires a signed-in user")]
    Unauthenticated,
}

impl FeedError {
    /// Message suitable for an inline error banner.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Network(_) => NETWORK,
            Self::Server { message, .. } => message.as_deref().unwrap_or(SERVER),
            Self::Unauthenticated => UNAUTHENTICATED,
        }
    }
}

impl From<ApiError> for FeedError {
    fn from(value: ApiError) -> Self {
        match value {
            ApiError::Status { status, message } => Self::Server { status, message },
            ApiError::Network(detail) | ApiError::Decode(detail) => Self::Network(detail),
            ApiError::Unauthenticated => Self::Unauthenticated,
        }
    }
}

/// Observable state of one feed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedState<I> {
    /// Items of the current page.
    pub items: Vec<I>,
    /// Zero-based index of the current page.
    pub page_index: u32,
    /// Total page count; zero when nothing matched.
    pub total_pages: u32,
    /// Total item count across pages.
    pub total_elements: u64,
    /// Whether the newest load is still outstanding.
    pub loading: bool,
    /// Error from the newest failed load, cleared by the next success.
    pub error: Option<FeedError>,
}

impl<I> Default for FeedState<I> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            page_index: 0,
            total_pages: 0,
            total_elements: 0,
            loading: false,
            error: None,
        }
    }
}

impl<I> FeedState<I> {
    /// Whether a following page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page_index.saturating_add(1) < self.total_pages
    }

    /// Whether a preceding page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page_index > 0
    }

    /// Whether a settled load produced no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.loading && self.items.is_empty()
    }
}

/// What a load request did to the feed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The response replaced the feed state.
    Applied,
    /// A newer load started first; the response was discarded.
    Superseded,
    /// Navigation was out of bounds; nothing was requested.
    Skipped,
}

type Fetch<I> = Rc<dyn Fn(PageRequest) -> LocalBoxFuture<'static, Result<Page<I>, ApiError>>>;

/// Paginated view over one query with a fixed page size.
pub struct PaginatedFeed<I> {
    page_size: u32,
    fetch: Fetch<I>,
    generation: Cell<u64>,
    state: StateCell<FeedState<I>>,
}

impl<I: fmt::Debug> fmt::Debug for PaginatedFeed<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaginatedFeed")
            .field("page_size", &self.page_size)
            .field("generation", &self.generation.get())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<I: Clone + 'static> PaginatedFeed<I> {
    /// Build an empty feed over `fetch`.
    #[must_use]
    pub fn new<F, Fut>(page_size: u32, fetch: F) -> Self
    where
        F: Fn(PageRequest) -> Fut + 'static,
        Fut: Future<Output = Result<Page<I>, ApiError>> + 'static,
    {
        Self {
            page_size,
            fetch: Rc::new(move |request| fetch(request).boxed_local()),
            generation: Cell::new(0),
            state: StateCell::new(FeedState::default()),
        }
    }

    /// Fixed page size.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> FeedState<I> {
        self.state.get()
    }

    /// Read the current state without cloning it.
    pub fn with_state<R>(&self, read: impl FnOnce(&FeedState<I>) -> R) -> R {
        self.state.with(read)
    }

    /// Observe state changes.
    pub fn subscribe(&self, listener: impl Fn(&FeedState<I>) + 'static) -> Subscription {
        self.state.subscribe(listener)
    }

    /// Load `page`, replacing the state when this is still the newest request.
    ///
    /// A response that points past the last page (the list shrank) triggers one
    /// reload of the last existing page.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError`] when the newest request fails; previous items are kept.
    pub async fn load(&self, page: u32) -> Result<LoadOutcome, FeedError> {
        let mut requested = page;
        let mut recovered = false;
        loop {
            let generation = self.begin();
            let result = (self.fetch)(PageRequest::new(requested, self.page_size)).await;
            if generation != self.generation.get() {
                debug!(page = requested, "discarding superseded feed response");
                return Ok(LoadOutcome::Superseded);
            }
            match result {
                Ok(page) if !recovered && page.total_pages > 0 && page.number >= page.total_pages => {
                    debug!(
                        page = page.number,
                        total_pages = page.total_pages,
                        "page out of range; loading last page"
                    );
                    requested = page.total_pages - 1;
                    recovered = true;
                }
                Ok(page) => {
                    self.apply(page);
                    return Ok(LoadOutcome::Applied);
                }
                Err(err) => {
                    let err = FeedError::from(err);
                    warn!(page = requested, error = %err, "feed load failed");
                    self.state.update(|state| {
                        state.loading = false;
                        state.error = Some(err.clone());
                    });
                    return Err(err);
                }
            }
        }
    }

    /// Load the following page; skipped on the last page.
    ///
    /// # Errors
    ///
    /// See [`PaginatedFeed::load`].
    pub async fn next(&self) -> Result<LoadOutcome, FeedError> {
        let target = self.state.with(|state| state.has_next().then_some(state.page_index + 1));
        match target {
            Some(page) => self.load(page).await,
            None => Ok(LoadOutcome::Skipped),
        }
    }

    /// Load the preceding page; skipped on the first page.
    ///
    /// # Errors
    ///
    /// See [`PaginatedFeed::load`].
    pub async fn previous(&self) -> Result<LoadOutcome, FeedError> {
        let target = self.state.with(|state| state.has_previous().then(|| state.page_index - 1));
        match target {
            Some(page) => self.load(page).await,
            None => Ok(LoadOutcome::Skipped),
        }
    }

    /// Reload the current page.
    ///
    /// # Errors
    ///
    /// See [`PaginatedFeed::load`].
    pub async fn reload(&self) -> Result<LoadOutcome, FeedError> {
        let page = self.state.with(|state| state.page_index);
        self.load(page).await
    }

    /// Drop all items and abandon any outstanding load.
    pub fn clear(&self) {
        self.generation.set(self.generation.get().wrapping_add(1));
        self.state.set(FeedState::default());
    }

    fn begin(&self) -> u64 {
        let generation = self.generation.get().wrapping_add(1);
        self.generation.set(generation);
        self.state.update(|state| state.loading = true);
        generation
    }

    fn apply(&self, page: Page<I>) {
        let page_index = if page.total_pages == 0 {
            0
        } else {
            page.number.min(page.total_pages - 1)
        };
        self.state.set(FeedState {
            items: page.content,
            page_index,
            total_pages: page.total_pages,
            total_elements: page.total_elements,
            loading: false,
            error: None,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::future::{Ready, ready};

    use super::*;
    use crate::testing::{GatedSource, numbered_page};

    fn numbered(
        count: Rc<Cell<u32>>,
        calls: Rc<RefCell<Vec<u32>>>,
    ) -> impl Fn(PageRequest) -> Ready<Result<Page<u32>, ApiError>> {
        move |request| {
            calls.borrow_mut().push(request.page);
            ready(Ok(numbered_page(count.get(), request)))
        }
    }

    fn feed_over(items: u32, size: u32) -> (PaginatedFeed<u32>, Rc<Cell<u32>>, Rc<RefCell<Vec<u32>>>) {
        let count = Rc::new(Cell::new(items));
        let calls = Rc::new(RefCell::new(Vec::new()));
        let feed = PaginatedFeed::new(size, numbered(count.clone(), calls.clone()));
        (feed, count, calls)
    }

    #[tokio::test]
    async fn next_walks_to_last_page_then_stops() -> Result<(), FeedError> {
        let (feed, _, calls) = feed_over(23, 6);
        assert_eq!(feed.load(0).await?, LoadOutcome::Applied);
        let total = feed.state().total_pages;
        assert_eq!(total, 4);

        for _ in 1..total {
            assert_eq!(feed.next().await?, LoadOutcome::Applied);
        }
        assert_eq!(feed.state().page_index, total - 1);
        assert_eq!(feed.state().items, vec![18, 19, 20, 21, 22]);

        assert_eq!(feed.next().await?, LoadOutcome::Skipped);
        assert_eq!(*calls.borrow(), vec![0, 1, 2, 3]);
        Ok(())
    }

    #[tokio::test]
    async fn previous_from_first_page_is_a_no_op() -> Result<(), FeedError> {
        let (feed, _, calls) = feed_over(10, 6);
        assert_eq!(feed.previous().await?, LoadOutcome::Skipped);
        feed.load(0).await?;
        assert_eq!(feed.previous().await?, LoadOutcome::Skipped);
        feed.next().await?;
        assert_eq!(feed.previous().await?, LoadOutcome::Applied);
        assert_eq!(*calls.borrow(), vec![0, 1, 0]);
        Ok(())
    }

    #[tokio::test]
    async fn empty_result_has_no_pages() -> Result<(), FeedError> {
        let (feed, _, calls) = feed_over(0, 6);
        feed.load(0).await?;
        let state = feed.state();
        assert_eq!((state.page_index, state.total_pages), (0, 0));
        assert!(state.is_empty());
        assert_eq!(feed.next().await?, LoadOutcome::Skipped);
        assert_eq!(calls.borrow().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn failure_keeps_previous_items() -> Result<(), FeedError> {
        let source = GatedSource::<u32>::new();
        let feed = PaginatedFeed::new(2, {
            let source = source.clone();
            move |request| source.fetch(request)
        });
        let _ = source.expect(0).send(Ok(numbered_page(6, PageRequest::new(0, 2))));
        feed.load(0).await?;

        let _ = source.expect(1).send(Err(ApiError::Status {
            status: 500,
            message: None,
        }));
        let err = feed.next().await.err();

        assert_eq!(err, Some(FeedError::Server { status: 500, message: None }));
        let state = feed.state();
        assert_eq!(state.items, vec![0, 1]);
        assert_eq!(state.page_index, 0);
        assert!(!state.loading);
        assert_eq!(state.error.as_ref().map(FeedError::user_message), Some(SERVER));
        Ok(())
    }

    #[tokio::test]
    async fn late_response_for_abandoned_page_is_discarded() -> Result<(), FeedError> {
        let source = GatedSource::<u32>::new();
        let feed = PaginatedFeed::new(2, {
            let source = source.clone();
            move |request| source.fetch(request)
        });
        let _ = source.expect(1).send(Ok(numbered_page(6, PageRequest::new(1, 2))));
        feed.load(1).await?;
        assert_eq!((feed.state().page_index, feed.state().total_pages), (1, 3));

        let stale = source.expect(0);
        let fresh = source.expect(2);
        let driver = async move {
            let _ = fresh.send(Ok(numbered_page(6, PageRequest::new(2, 2))));
            tokio::task::yield_now().await;
            let _ = stale.send(Ok(numbered_page(6, PageRequest::new(0, 2))));
        };

        let (first, second, ()) = futures_util::join!(feed.load(0), feed.load(2), driver);

        assert_eq!(first?, LoadOutcome::Superseded);
        assert_eq!(second?, LoadOutcome::Applied);
        let state = feed.state();
        assert_eq!(state.page_index, 2);
        assert_eq!(state.items, vec![4, 5]);
        assert!(!state.loading);
        Ok(())
    }

    #[tokio::test]
    async fn shrunken_list_recovers_to_last_page() -> Result<(), FeedError> {
        let (feed, count, calls) = feed_over(5, 2);
        feed.load(2).await?;
        assert_eq!(feed.state().items, vec![4]);

        count.set(4);
        assert_eq!(feed.reload().await?, LoadOutcome::Applied);

        let state = feed.state();
        assert_eq!((state.page_index, state.total_pages), (1, 2));
        assert_eq!(state.items, vec![2, 3]);
        assert_eq!(*calls.borrow(), vec![2, 2, 1]);
        Ok(())
    }

    #[tokio::test]
    async fn subscribers_see_loading_then_settled_state() -> Result<(), FeedError> {
        let (feed, _, _) = feed_over(3, 6);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _subscription = feed.subscribe(move |state| {
            sink.borrow_mut().push((state.loading, state.items.len()));
        });

        feed.load(0).await?;

        assert_eq!(*seen.borrow(), vec![(true, 0), (false, 3)]);
        Ok(())
    }

    #[tokio::test]
    async fn clear_abandons_outstanding_load() -> Result<(), FeedError> {
        let source = GatedSource::<u32>::new();
        let feed = PaginatedFeed::new(2, {
            let source = source.clone();
            move |request| source.fetch(request)
        });
        let gate = source.expect(0);
        let driver = async {
            tokio::task::yield_now().await;
            feed.clear();
            let _ = gate.send(Ok(numbered_page(4, PageRequest::new(0, 2))));
        };

        let (outcome, ()) = futures_util::join!(feed.load(0), driver);

        assert_eq!(outcome?, LoadOutcome::Superseded);
        assert_eq!(feed.state(), FeedState::default());
        Ok(())
    }
}
