#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Shared HTTP DTOs for the Cinevault catalog API.
//!
//! The backend speaks camelCase JSON under `/api/v1`. These types mirror that
//! contract one-to-one so the client never reaches for untyped values; any
//! client-side reshaping (for example tagging feed items) happens after
//! decoding, in the UI crate.
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error payload returned by the backend for every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ErrorResponse {
    /// Server-side timestamp, formatted `dd-MM-yyyy HH:mm:ss`.
    pub timestamp: Option<String>,
    /// HTTP status code echoed in the body.
    pub status: u16,
    /// Reason phrase (`Conflict`, `Unauthorized`, ...).
    pub error: Option<String>,
    /// Human-readable message suitable for display.
    pub message: Option<String>,
    /// Request path that produced the error.
    pub path: Option<String>,
    /// Per-field validation messages, when the request failed validation.
    pub details: Option<Vec<String>>,
}

impl ErrorResponse {
    /// Display message, ignoring blank strings.
    #[must_use]
    pub fn display_message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|message| !message.is_empty())
    }
}

/// Body for `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    /// Account email address.
    pub email: String,
    /// Plain-text password; only ever sent over the wire.
    pub password: String,
}

/// Body for `POST /auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Display name for the new account.
    pub full_name: String,
    /// Account email address; must be unique server-side.
    pub email: String,
    /// Plain-text password.
    pub password: String,
    /// Optional country of residence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Response for both login and registration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthResponse {
    /// Signed bearer token.
    pub token: String,
    /// Token scheme; always `Bearer` today.
    #[serde(rename = "type", default = "default_token_type")]
    pub token_type: String,
    /// Profile of the authenticated account.
    pub user: UserProfile,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Role attached to a user account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRole {
    /// Role identifier.
    pub id: Uuid,
    /// Role name (`USER`, `ADMIN`).
    pub name: String,
}

/// User profile as returned by the auth endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Account identifier; used as the acting user for watchlist calls.
    pub id: Uuid,
    /// Display name.
    pub full_name: String,
    /// Account email address.
    pub email: String,
    /// Country of residence, when provided at registration.
    #[serde(default)]
    pub country: Option<String>,
    /// Creation timestamp (server local time).
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    /// Last update timestamp (server local time).
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
    /// Assigned role.
    #[serde(rename = "userRole", default)]
    pub role: Option<UserRole>,
}

/// Content type reference (`Movie`, `TV Show`, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentType {
    /// Content type identifier.
    pub id: Uuid,
    /// Content type name, as accepted by the `by-type` filters.
    pub name: String,
}

/// Genre reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    /// Genre identifier.
    pub id: Uuid,
    /// Genre name, as accepted by the `by-genre` filters.
    pub name: String,
}

/// Catalog title (movie or series).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    /// Content identifier.
    pub id: Uuid,
    /// Title.
    pub title: String,
    /// Synopsis.
    #[serde(default)]
    pub description: Option<String>,
    /// Release date.
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    /// Free-form duration label (`2h 10m`).
    #[serde(default)]
    pub duration: Option<String>,
    /// Primary audio language.
    #[serde(default)]
    pub language: Option<String>,
    /// Poster or thumbnail URL.
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    /// Playback URL.
    #[serde(default)]
    pub video_url: Option<String>,
    /// Whether the title is currently playable.
    #[serde(default)]
    pub is_available: bool,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
    /// Content type tag.
    #[serde(default)]
    pub content_type: Option<ContentType>,
    /// Genres attached to the title.
    #[serde(default)]
    pub genres: Vec<Genre>,
    /// Number of episodes (zero or absent for movies).
    #[serde(default)]
    pub episode_count: Option<u32>,
}

/// Single episode of a series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    /// Episode identifier.
    pub id: Uuid,
    /// Season number, starting at 1.
    pub season_number: u32,
    /// Episode number within the season, starting at 1.
    pub episode_number: u32,
    /// Episode title.
    pub title: String,
    /// Synopsis.
    #[serde(default)]
    pub description: Option<String>,
    /// Free-form duration label.
    #[serde(default)]
    pub duration: Option<String>,
    /// Air date.
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    /// Thumbnail URL.
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    /// Playback URL.
    #[serde(default)]
    pub video_url: Option<String>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
    /// Parent content identifier.
    pub content_id: Uuid,
    /// Parent content title.
    #[serde(default)]
    pub content_title: Option<String>,
}

/// Uniform page envelope returned by every list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page.
    pub content: Vec<T>,
    /// Total item count across all pages.
    pub total_elements: u64,
    /// Total page count; zero when the query matched nothing.
    pub total_pages: u32,
    /// Zero-based index of this page.
    pub number: u32,
    /// Requested page size.
    pub size: u32,
    /// Whether this is the first page.
    #[serde(default)]
    pub first: bool,
    /// Whether this is the last page.
    #[serde(default)]
    pub last: bool,
}

impl<T> Page<T> {
    /// Empty page envelope for a zero-result query.
    #[must_use]
    pub const fn empty(size: u32) -> Self {
        Self {
            content: Vec::new(),
            total_elements: 0,
            total_pages: 0,
            number: 0,
            size,
            first: true,
            last: true,
        }
    }

    /// Convert the items while keeping the pagination metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            number: self.number,
            size: self.size,
            first: self.first,
            last: self.last,
        }
    }
}
