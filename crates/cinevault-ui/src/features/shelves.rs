//! Movies and Series pages: fixed genre shelves plus a user-picked genre.
//!
//! # Design
//! - Action and Drama shelves always exist and page independently.
//! - The picked-genre shelf reads its genre at request time; no genre means an
//!   empty page and no request.
//! - The genre list for the picker is fetched once per view.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use cinevault_api_models::{Genre, Page};
use tracing::debug;

use crate::core::feed::{FeedError, LoadOutcome, PaginatedFeed};
use crate::core::store::{StateCell, Subscription};
use crate::features::{content_feed, first_error};
use crate::models::Item;
use crate::services::api::{ApiClient, PageRequest};

/// Which catalog a shelves page shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShelfKind {
    /// Films.
    Movies,
    /// Television series.
    Series,
}

impl ShelfKind {
    /// Content type name understood by the catalog filters.
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Movies => "Movie",
            Self::Series => "TV Show",
        }
    }
}

/// Feeds behind the movies or series page.
#[derive(Debug)]
pub struct CatalogShelves {
    kind: ShelfKind,
    api: ApiClient,
    genre_page_size: u32,
    genres_loaded: Cell<bool>,
    genres: StateCell<Vec<Genre>>,
    selected: Rc<RefCell<Option<String>>>,
    /// Action titles of this kind.
    pub action: PaginatedFeed<Item>,
    /// Drama titles of this kind.
    pub drama: PaginatedFeed<Item>,
    /// Titles of the picked genre.
    pub picked: PaginatedFeed<Item>,
}

impl CatalogShelves {
    /// Build the shelves; nothing is fetched until [`CatalogShelves::load`].
    #[must_use]
    pub fn new(api: &ApiClient, kind: ShelfKind, page_size: u32, genre_page_size: u32) -> Self {
        let selected = Rc::new(RefCell::new(None::<String>));
        let picked = {
            let selected = Rc::clone(&selected);
            content_feed(api, page_size, move |api, page| {
                let genre = selected.borrow().clone();
                async move {
                    match genre {
                        Some(genre) => api.filter(Some(kind.type_name()), Some(&genre), page).await,
                        None => Ok(Page::empty(page.size)),
                    }
                }
            })
        };
        Self {
            kind,
            api: api.clone(),
            genre_page_size,
            genres_loaded: Cell::new(false),
            genres: StateCell::new(Vec::new()),
            selected,
            action: genre_shelf(api, kind, "Action", page_size),
            drama: genre_shelf(api, kind, "Drama", page_size),
            picked,
        }
    }

    /// Catalog shown by this page.
    #[must_use]
    pub const fn kind(&self) -> ShelfKind {
        self.kind
    }

    /// Genres available to the picker.
    #[must_use]
    pub fn genres(&self) -> Vec<Genre> {
        self.genres.get()
    }

    /// Observe the genre list.
    pub fn subscribe_genres(&self, listener: impl Fn(&Vec<Genre>) + 'static) -> Subscription {
        self.genres.subscribe(listener)
    }

    /// Currently picked genre.
    #[must_use]
    pub fn selected_genre(&self) -> Option<String> {
        self.selected.borrow().clone()
    }

    /// Load the genre list (first call only) and the first page of both fixed shelves.
    ///
    /// # Errors
    ///
    /// Returns the first failure; the remaining loads still complete.
    pub async fn load(&self) -> Result<(), FeedError> {
        let (genres, action, drama) = futures_util::join!(
            self.load_genres(),
            self.action.load(0),
            self.drama.load(0)
        );
        genres?;
        first_error([action, drama])
    }

    /// Pick a genre for the third shelf, or clear it with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError`] when the picked shelf fails to load.
    pub async fn select_genre(&self, genre: Option<&str>) -> Result<LoadOutcome, FeedError> {
        let genre = genre.map(str::trim).filter(|name| !name.is_empty());
        *self.selected.borrow_mut() = genre.map(str::to_string);
        if genre.is_none() {
            self.picked.clear();
            return Ok(LoadOutcome::Skipped);
        }
        self.picked.load(0).await
    }

    async fn load_genres(&self) -> Result<(), FeedError> {
        if self.genres_loaded.get() {
            debug!("genre list already loaded");
            return Ok(());
        }
        let page = self
            .api
            .genres(PageRequest::new(0, self.genre_page_size))
            .await?;
        self.genres_loaded.set(true);
        self.genres.set(page.content);
        Ok(())
    }
}

fn genre_shelf(api: &ApiClient, kind: ShelfKind, genre: &'static str, page_size: u32) -> PaginatedFeed<Item> {
    content_feed(api, page_size, move |api, page| async move {
        api.filter(Some(kind.type_name()), Some(genre), page).await
    })
}
