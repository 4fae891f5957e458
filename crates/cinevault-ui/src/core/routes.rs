//! Route table and navigation guards.
//!
//! # Design
//! - Paths map to a closed `Route` enum; anything unrecognised lands on login.
//! - Guards read the session synchronously at navigation time and never await.

use std::fmt;

use tracing::debug;
use uuid::Uuid;

use crate::core::session::{Session, SessionManager};

/// Client-side destinations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    /// Sign-in form.
    Login,
    /// Account creation form.
    Register,
    /// Landing page with popular and recent carousels.
    Browse,
    /// Movie shelves by genre.
    Movies,
    /// Series shelves by genre.
    Series,
    /// Personal watchlist.
    MyList,
    /// Title search.
    Search,
    /// Profile of the signed-in user.
    Account,
    /// Single movie or series.
    Content {
        /// Content identifier.
        id: Uuid,
    },
    /// Series detail with seasons and episodes.
    Show {
        /// Content identifier of the series.
        id: Uuid,
    },
}

impl Route {
    /// Resolve a location path (query and fragment ignored).
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            ["register"] => Self::Register,
            ["browse"] => Self::Browse,
            ["movies"] => Self::Movies,
            ["series"] => Self::Series,
            ["my-list"] => Self::MyList,
            ["search"] => Self::Search,
            ["account"] => Self::Account,
            ["content", id] => Uuid::parse_str(id).map_or(Self::Login, |id| Self::Content { id }),
            ["show", id] => Uuid::parse_str(id).map_or(Self::Login, |id| Self::Show { id }),
            _ => Self::Login,
        }
    }

    /// Location path for this route.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::Browse => "/browse".to_string(),
            Self::Movies => "/movies".to_string(),
            Self::Series => "/series".to_string(),
            Self::MyList => "/my-list".to_string(),
            Self::Search => "/search".to_string(),
            Self::Account => "/account".to_string(),
            Self::Content { id } => format!("/content/{id}"),
            Self::Show { id } => format!("/show/{id}"),
        }
    }

    /// Guard protecting this route.
    #[must_use]
    pub const fn guard(&self) -> Guard {
        match self {
            Self::Login | Self::Register => Guard::Guest,
            _ => Guard::Authenticated,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Navigation gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Guard {
    /// Only signed-in users; others go to login.
    Authenticated,
    /// Only anonymous users; signed-in users go to browse.
    Guest,
}

/// Result of evaluating a guard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Navigation may proceed.
    Allow,
    /// Navigation is blocked in favour of another route.
    Redirect(Route),
}

impl Guard {
    /// Evaluate against the current session.
    #[must_use]
    pub const fn check(self, session: &Session) -> GuardDecision {
        match (self, session.is_authenticated()) {
            (Self::Authenticated, true) | (Self::Guest, false) => GuardDecision::Allow,
            (Self::Authenticated, false) => GuardDecision::Redirect(Route::Login),
            (Self::Guest, true) => GuardDecision::Redirect(Route::Browse),
        }
    }
}

/// Guard assignment for `route`.
#[must_use]
pub const fn guard_for(route: Route) -> Guard {
    route.guard()
}

/// Route actually shown when navigating to `target`.
#[must_use]
pub fn navigate(target: Route, session: &SessionManager) -> Route {
    match guard_for(target).check(&session.session()) {
        GuardDecision::Allow => target,
        GuardDecision::Redirect(route) => {
            debug!(from = %target, to = %route, "navigation redirected");
            route
        }
    }
}
