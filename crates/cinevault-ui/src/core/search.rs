//! Keystroke debouncing in front of a search feed.
//!
//! # Design
//! - Each keystroke takes a stamp, then waits out the quiet period; only the newest
//!   stamp survives the wait.
//! - A surviving value equal to the last emitted one is dropped.
//! - Blank values clear the feed locally; no request is made.
//! - Paging reuses the last non-blank query.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use cinevault_api_models::Page;
use tracing::debug;

use crate::core::clock::Timer;
use crate::core::feed::{FeedError, LoadOutcome, PaginatedFeed};
use crate::services::api::{ApiError, PageRequest};

/// What happened to one keystroke.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A later keystroke arrived inside the quiet period.
    Superseded,
    /// Same value as the last emitted one.
    Unchanged,
    /// Blank value; results were cleared.
    Cleared,
    /// The feed was reloaded from page zero.
    Searched(LoadOutcome),
}

/// Debounced search driving one paginated feed.
pub struct SearchDebouncer<I> {
    timer: Rc<dyn Timer>,
    quiet: Duration,
    keystroke: Cell<u64>,
    last_emitted: RefCell<Option<String>>,
    query: Rc<RefCell<String>>,
    feed: PaginatedFeed<I>,
}

impl<I: fmt::Debug> fmt::Debug for SearchDebouncer<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchDebouncer")
            .field("quiet", &self.quiet)
            .field("query", &self.query.borrow())
            .field("feed", &self.feed)
            .finish_non_exhaustive()
    }
}

impl<I: Clone + 'static> SearchDebouncer<I> {
    /// Build a debouncer whose feed calls `search(query, page)`.
    #[must_use]
    pub fn new<F, Fut>(timer: Rc<dyn Timer>, quiet: Duration, page_size: u32, search: F) -> Self
    where
        F: Fn(String, PageRequest) -> Fut + 'static,
        Fut: Future<Output = Result<Page<I>, ApiError>> + 'static,
    {
        let query = Rc::new(RefCell::new(String::new()));
        let feed = PaginatedFeed::new(page_size, {
            let query = Rc::clone(&query);
            move |request| search(query.borrow().clone(), request)
        });
        Self {
            timer,
            quiet,
            keystroke: Cell::new(0),
            last_emitted: RefCell::new(None),
            query,
            feed,
        }
    }

    /// Feed holding the results.
    #[must_use]
    pub const fn feed(&self) -> &PaginatedFeed<I> {
        &self.feed
    }

    /// Last non-blank query sent to the backend.
    #[must_use]
    pub fn query(&self) -> Option<String> {
        let query = self.query.borrow();
        (!query.is_empty()).then(|| query.clone())
    }

    /// Feed one raw input value; resolves after the quiet period.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError`] when the emitted search fails.
    pub async fn input(&self, raw: &str) -> Result<SearchOutcome, FeedError> {
        let stamp = self.keystroke.get().wrapping_add(1);
        self.keystroke.set(stamp);
        self.timer.sleep(self.quiet).await;
        if stamp != self.keystroke.get() {
            debug!("search keystroke superseded");
            return Ok(SearchOutcome::Superseded);
        }
        self.emit(raw).await
    }

    /// Following page of the current results.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError`] when the page load fails.
    pub async fn next(&self) -> Result<LoadOutcome, FeedError> {
        self.feed.next().await
    }

    /// Preceding page of the current results.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError`] when the page load fails.
    pub async fn previous(&self) -> Result<LoadOutcome, FeedError> {
        self.feed.previous().await
    }

    async fn emit(&self, value: &str) -> Result<SearchOutcome, FeedError> {
        if self.last_emitted.borrow().as_deref() == Some(value) {
            debug!("search value unchanged");
            return Ok(SearchOutcome::Unchanged);
        }
        *self.last_emitted.borrow_mut() = Some(value.to_string());

        let term = value.trim();
        if term.is_empty() {
            self.feed.clear();
            return Ok(SearchOutcome::Cleared);
        }
        term.clone_into(&mut self.query.borrow_mut());
        self.feed.load(0).await.map(SearchOutcome::Searched)
    }
}
