//! Browser boot: platform adapters, context construction and URL sync.
//!
//! # Design
//! - Exactly one `AppContext` per page load, kept in a thread-local for the renderer.
//! - The address bar follows the shown route; guard redirects replace the typed URL.

use std::cell::RefCell;
use std::rc::Rc;

use gloo::console;
use gloo::utils::window;
use tracing::info;
use wasm_bindgen::JsValue;

use crate::context::AppContext;
use crate::core::clock::SystemClock;
use crate::core::config::ClientConfig;
use crate::core::routes::Route;
use crate::core::store::Subscription;
use crate::services::http::GlooTransport;

mod storage;
mod telemetry;
mod timer;

struct Booted {
    context: Rc<AppContext>,
    _url_sync: Subscription,
}

thread_local! {
    static BOOTED: RefCell<Option<Booted>> = const { RefCell::new(None) };
}

/// Boot the client for the current page.
pub fn run_app() {
    console_error_panic_hook::set_once();
    let location = window().location();
    let config = ClientConfig::from_location(&location.href().unwrap_or_default());
    telemetry::init_logging(&config.log_level);

    let transport = Rc::new(GlooTransport::new(config.api_base_url.clone()));
    let context = Rc::new(AppContext::new(
        config,
        Rc::new(storage::LocalStore),
        transport,
        Rc::new(SystemClock),
        Rc::new(timer::GlooTimer),
    ));

    let route = context.start(&location.pathname().unwrap_or_default());
    replace_path(route);
    info!(%route, api = %context.config().api_base_url, "client started");

    let url_sync = context.subscribe_route(|route| push_path(*route));
    BOOTED.with(|booted| {
        *booted.borrow_mut() = Some(Booted {
            context,
            _url_sync: url_sync,
        });
    });
}

/// Context built by [`run_app`].
#[must_use]
pub fn app_context() -> Option<Rc<AppContext>> {
    BOOTED.with(|booted| booted.borrow().as_ref().map(|b| Rc::clone(&b.context)))
}

fn push_path(route: Route) {
    let path = route.path();
    let Ok(current) = window().location().pathname() else {
        return;
    };
    if current == path {
        return;
    }
    let pushed = window()
        .history()
        .and_then(|history| history.push_state_with_url(&JsValue::NULL, "", Some(&path)));
    if let Err(err) = pushed {
        console::error!("history update failed", err);
    }
}

fn replace_path(route: Route) {
    let path = route.path();
    let replaced = window()
        .history()
        .and_then(|history| history.replace_state_with_url(&JsValue::NULL, "", Some(&path)));
    if let Err(err) = replaced {
        console::error!("history update failed", err);
    }
}
