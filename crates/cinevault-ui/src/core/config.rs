//! Client configuration and API base URL discovery.
//!
//! # Design
//! - Defaults match the catalog backend's development setup.
//! - Base URL discovery is pure (href in, URL out) so it is testable without a DOM.

use std::fmt::Write as _;
use std::time::Duration;

use url::Url;

/// Fallback API base URL when the page location is unusable.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api/v1";

const API_PREFIX: &str = "/api/v1";
const DEV_SERVER_PORT: u16 = 4200;
const BACKEND_PORT: u16 = 8080;

/// Runtime configuration shared by the session, feeds and transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Absolute API base URL including the `/api/v1` prefix.
    pub api_base_url: String,
    /// Prefix for persisted storage keys.
    pub storage_prefix: String,
    /// Quiet period before a search keystroke is emitted.
    pub search_debounce: Duration,
    /// Page size for dashboard carousels.
    pub carousel_page_size: u32,
    /// Page size for full-page result lists.
    pub list_page_size: u32,
    /// Page size for the personal watchlist.
    pub watchlist_page_size: u32,
    /// Page size for a season's episode list.
    pub episode_page_size: u32,
    /// Number of genres fetched for filter chips.
    pub genre_page_size: u32,
    /// Tracing filter directive (`info`, `cinevault_ui=debug`, ...).
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            storage_prefix: "cinevault".to_string(),
            search_debounce: Duration::from_millis(500),
            carousel_page_size: 6,
            list_page_size: 12,
            watchlist_page_size: 12,
            episode_page_size: 10,
            genre_page_size: 20,
            log_level: "info".to_string(),
        }
    }
}

impl ClientConfig {
    /// Defaults with the API base URL derived from the page location.
    #[must_use]
    pub fn from_location(href: &str) -> Self {
        Self {
            api_base_url: api_base_url_for(href),
            ..Self::default()
        }
    }

    /// Override the API base URL; a trailing slash is dropped.
    #[must_use]
    pub fn with_api_base_url(mut self, base: impl Into<String>) -> Self {
        let base = base.into();
        self.api_base_url = base.trim_end_matches('/').to_string();
        self
    }

    /// Storage key holding the bearer token.
    #[must_use]
    pub fn token_key(&self) -> String {
        format!("{}.token", self.storage_prefix)
    }

    /// Storage key holding the cached user profile.
    #[must_use]
    pub fn user_key(&self) -> String {
        format!("{}.user", self.storage_prefix)
    }
}

/// Map a page location to the API base URL on the same host.
///
/// The Angular-style dev server port (4200) maps to the backend port (8080); any
/// other explicit port is kept.
#[must_use]
pub fn api_base_url_for(href: &str) -> String {
    let Ok(url) = Url::parse(href) else {
        return DEFAULT_API_BASE_URL.to_string();
    };
    let Some(host) = url.host_str() else {
        return DEFAULT_API_BASE_URL.to_string();
    };

    let mut base = format!("{}://{}", url.scheme(), host);
    match url.port() {
        None => {}
        Some(DEV_SERVER_PORT) => {
            let _ = write!(base, ":{BACKEND_PORT}");
        }
        Some(port) => {
            let _ = write!(base, ":{port}");
        }
    }
    base.push_str(API_PREFIX);
    base
}
