//! Application context: wiring of session, transport and views.
//!
//! # Design
//! - Built once per boot and handed to the rendering layer; tests build their own.
//! - The session talks to the raw transport; everything else goes through the
//!   auth interceptor.
//! - When the session ends while a protected route is showing, the route falls back
//!   to login.

use std::fmt;
use std::rc::Rc;

use cinevault_api_models::RegisterRequest;
use tracing::info;
use uuid::Uuid;

use crate::core::clock::{Clock, Timer};
use crate::core::config::ClientConfig;
use crate::core::routes::{self, Guard, Route};
use crate::core::session::{AuthError, Session, SessionManager};
use crate::core::store::{KeyValueStore, StateCell, Subscription, TokenStore};
use crate::core::watchlist::WatchlistMutator;
use crate::features::browse::BrowseView;
use crate::features::my_list::MyListView;
use crate::features::search::{SearchView, search_view};
use crate::features::shelves::{CatalogShelves, ShelfKind};
use crate::features::show_detail::ShowDetail;
use crate::services::api::ApiClient;
use crate::services::interceptor::AuthInterceptor;
use crate::services::transport::Transport;

/// Everything a view needs, built once per boot.
pub struct AppContext {
    config: ClientConfig,
    session: Rc<SessionManager>,
    api: ApiClient,
    timer: Rc<dyn Timer>,
    route: Rc<StateCell<Route>>,
    _session_watch: Subscription,
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .field("session", &self.session)
            .field("route", &self.route.get())
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Wire the client over the given platform seams.
    #[must_use]
    pub fn new(
        config: ClientConfig,
        storage: Rc<dyn KeyValueStore>,
        transport: Rc<dyn Transport>,
        clock: Rc<dyn Clock>,
        timer: Rc<dyn Timer>,
    ) -> Self {
        let session = Rc::new(SessionManager::new(
            TokenStore::new(storage, &config),
            clock,
            ApiClient::new(Rc::clone(&transport)),
        ));
        let api = ApiClient::new(Rc::new(AuthInterceptor::new(transport, Rc::clone(&session))));
        let route = Rc::new(StateCell::new(Route::Login));
        let session_watch = session.subscribe({
            let route = Rc::clone(&route);
            move |session: &Session| {
                if !session.is_authenticated() && route.get().guard() == Guard::Authenticated {
                    info!("session ended; returning to login");
                    route.set(Route::Login);
                }
            }
        });
        Self {
            config,
            session,
            api,
            timer,
            route,
            _session_watch: session_watch,
        }
    }

    /// Restore any persisted session and resolve the initial location.
    pub fn start(&self, path: &str) -> Route {
        self.session.restore_from_storage();
        self.navigate(Route::from_path(path))
    }

    /// Navigate through the route's guard; returns the route actually shown.
    pub fn navigate(&self, target: Route) -> Route {
        let shown = routes::navigate(target, &self.session);
        self.route.set(shown);
        shown
    }

    /// Route currently shown.
    #[must_use]
    pub fn current_route(&self) -> Route {
        self.route.get()
    }

    /// Observe route changes.
    pub fn subscribe_route(&self, listener: impl Fn(&Route) + 'static) -> Subscription {
        self.route.subscribe(listener)
    }

    /// Sign in and open the browse page.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] from the login call; the route is unchanged.
    pub async fn login(&self, email: &str, password: &str) -> Result<Route, AuthError> {
        self.session.login(email, password).await?;
        Ok(self.navigate(Route::Browse))
    }

    /// Register, sign in and open the browse page.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] from the registration call; the route is unchanged.
    pub async fn register(&self, profile: RegisterRequest) -> Result<Route, AuthError> {
        self.session.register(profile).await?;
        Ok(self.navigate(Route::Browse))
    }

    /// Sign out and show the login page.
    pub fn logout(&self) -> Route {
        self.session.logout();
        self.navigate(Route::Login)
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Shared session.
    #[must_use]
    pub const fn session(&self) -> &Rc<SessionManager> {
        &self.session
    }

    /// Authenticated API client.
    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Watchlist mutator for detail pages and cards.
    #[must_use]
    pub fn watchlist(&self) -> WatchlistMutator {
        WatchlistMutator::new(self.api.clone(), Rc::clone(&self.session))
    }

    /// State for the browse page.
    #[must_use]
    pub fn browse(&self) -> BrowseView {
        BrowseView::new(&self.api, self.config.carousel_page_size)
    }

    /// State for the movies page.
    #[must_use]
    pub fn movies(&self) -> CatalogShelves {
        self.shelves(ShelfKind::Movies)
    }

    /// State for the series page.
    #[must_use]
    pub fn series(&self) -> CatalogShelves {
        self.shelves(ShelfKind::Series)
    }

    /// State for the search page.
    #[must_use]
    pub fn search(&self) -> SearchView {
        search_view(
            &self.api,
            Rc::clone(&self.timer),
            self.config.search_debounce,
            self.config.list_page_size,
        )
    }

    /// State for the my-list page.
    #[must_use]
    pub fn my_list(&self) -> MyListView {
        MyListView::new(
            &self.api,
            Rc::clone(&self.session),
            self.config.watchlist_page_size,
        )
    }

    /// State for a title's detail page.
    #[must_use]
    pub fn show_detail(&self, content_id: Uuid) -> ShowDetail {
        ShowDetail::new(&self.api, content_id, self.config.episode_page_size)
    }

    fn shelves(&self, kind: ShelfKind) -> CatalogShelves {
        CatalogShelves::new(
            &self.api,
            kind,
            self.config.carousel_page_size,
            self.config.genre_page_size,
        )
    }
}
