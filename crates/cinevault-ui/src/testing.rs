//! Test doubles and fixture builders shared by unit tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use cinevault_api_models::Page;
use serde_json::{Value, json};
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::core::clock::{Clock, Timer};
use crate::core::config::ClientConfig;
use crate::core::session::SessionManager;
use crate::core::store::{KeyValueStore, MemoryStore, StoreError, TokenStore};
use crate::services::api::{ApiClient, ApiError, PageRequest};
use crate::services::transport::{ApiRequest, ApiResponse, Method, Transport, TransportError};

/// Fixed "now" used across tests (a whole second).
pub(crate) const NOW_MS: i64 = 1_760_000_000_000;

/// Unsigned token around an arbitrary payload string.
pub(crate) fn encode_token(payload: &str) -> String {
    format!(
        "{}.{}.signature",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(payload)
    )
}

/// Token whose `exp` is `exp_secs` with subject `sub`.
pub(crate) fn token_expiring_at(exp_secs: i64, sub: &str) -> String {
    encode_token(&json!({ "sub": sub, "exp": exp_secs, "iat": exp_secs - 3600 }).to_string())
}

/// Scripted transport: one sticky response per method and path, 404 otherwise.
#[derive(Default)]
pub(crate) struct FakeTransport {
    responses: RefCell<HashMap<(Method, String), ApiResponse>>,
    sent: RefCell<Vec<ApiRequest>>,
    offline: Cell<bool>,
}

impl FakeTransport {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub(crate) fn respond(&self, method: Method, path: &str, status: u16, body: impl Into<String>) {
        self.responses
            .borrow_mut()
            .insert((method, path.to_string()), ApiResponse::new(status, body));
    }

    pub(crate) fn go_offline(&self) {
        self.offline.set(true);
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.sent.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Transport for FakeTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let key = (request.method, request.path.clone());
        self.sent.borrow_mut().push(request);
        if self.offline.get() {
            return Err(TransportError("offline".into()));
        }
        Ok(self
            .responses
            .borrow()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| ApiResponse::new(404, "")))
    }
}

/// Storage that refuses writes, as LocalStorage does when full or disabled.
#[derive(Default)]
pub(crate) struct RejectingStore {
    pub(crate) inner: MemoryStore,
    accepted: Option<String>,
}

impl RejectingStore {
    pub(crate) fn rejecting_all() -> Self {
        Self::default()
    }

    /// Accepts writes to `key` only.
    pub(crate) fn accepting(key: &str) -> Self {
        Self {
            inner: MemoryStore::new(),
            accepted: Some(key.to_string()),
        }
    }
}

impl KeyValueStore for RejectingStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.accepted.as_deref() == Some(key) {
            return self.inner.set(key, value);
        }
        Err(StoreError {
            key: key.to_string(),
            detail: "quota exceeded".into(),
        })
    }

    fn remove(&self, key: &str) {
        self.inner.remove(key);
    }
}

/// Settable clock.
pub(crate) struct FixedClock(Cell<i64>);

impl FixedClock {
    pub(crate) const fn new(now_ms: i64) -> Self {
        Self(Cell::new(now_ms))
    }

    pub(crate) fn advance_ms(&self, delta: i64) {
        self.0.set(self.0.get() + delta);
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0.get()
    }
}

/// Timer on tokio's (pausable) clock.
pub(crate) struct TokioTimer;

#[async_trait(?Send)]
impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

pub(crate) fn user_value(id: Uuid) -> Value {
    json!({
        "id": id,
        "fullName": "Uma Reader",
        "email": "uma@example.com",
        "country": "NZ",
        "createdAt": "2025-01-02T03:04:05",
        "updatedAt": null,
        "userRole": {"id": "7b6c2f0e-5d1a-4c8e-9f3b-2a1d0c9e8f7a", "name": "USER"}
    })
}

pub(crate) fn auth_body(token: &str, user_id: Uuid) -> String {
    json!({"token": token, "type": "Bearer", "user": user_value(user_id)}).to_string()
}

pub(crate) fn content_json(title: &str) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "title": title,
        "description": "A title",
        "releaseDate": "1995-12-15",
        "duration": "2h 50m",
        "language": "English",
        "isAvailable": true,
        "contentType": {"id": Uuid::new_v4(), "name": "Movie"},
        "genres": [{"id": Uuid::new_v4(), "name": "Action"}],
        "episodeCount": 0
    })
}

pub(crate) fn episode_json(content_id: Uuid, season: u32, episode: u32) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "seasonNumber": season,
        "episodeNumber": episode,
        "title": format!("Episode {episode}"),
        "contentId": content_id,
        "contentTitle": "Dark"
    })
}

pub(crate) fn page_json(content: Vec<Value>, number: u32, total_pages: u32, size: u32) -> String {
    let total_elements = content.len();
    json!({
        "content": content,
        "totalElements": total_elements,
        "totalPages": total_pages,
        "number": number,
        "size": size,
        "first": number == 0,
        "last": number + 1 >= total_pages
    })
    .to_string()
}

/// Page of `0..count` integers as the backend would slice it.
pub(crate) fn numbered_page(count: u32, request: PageRequest) -> Page<u32> {
    let start = request.page * request.size;
    let end = (start + request.size).min(count);
    let total_pages = count.div_ceil(request.size);
    Page {
        content: (start.min(end)..end).collect(),
        total_elements: u64::from(count),
        total_pages,
        number: request.page,
        size: request.size,
        first: request.page == 0,
        last: request.page + 1 >= total_pages,
    }
}

type Gate<I> = oneshot::Receiver<Result<Page<I>, ApiError>>;

/// Feed source whose responses are released by the test, one page at a time.
pub(crate) struct GatedSource<I> {
    gates: RefCell<HashMap<u32, Gate<I>>>,
}

impl<I: 'static> GatedSource<I> {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self {
            gates: RefCell::new(HashMap::new()),
        })
    }

    /// Register the next request for `page`; the returned sender releases it.
    pub(crate) fn expect(&self, page: u32) -> oneshot::Sender<Result<Page<I>, ApiError>> {
        let (sender, receiver) = oneshot::channel();
        self.gates.borrow_mut().insert(page, receiver);
        sender
    }

    pub(crate) fn fetch(
        &self,
        request: PageRequest,
    ) -> impl Future<Output = Result<Page<I>, ApiError>> + use<I> {
        let gate = self.gates.borrow_mut().remove(&request.page);
        async move {
            match gate {
                Some(receiver) => receiver
                    .await
                    .unwrap_or_else(|_| Err(ApiError::Network("gate dropped".into()))),
                None => Err(ApiError::Network(format!("unexpected page {}", request.page))),
            }
        }
    }
}

/// Session restored from storage for `user`, or anonymous for `None`.
pub(crate) fn signed_in_session(transport: &Rc<FakeTransport>, user: Option<Uuid>) -> Rc<SessionManager> {
    let storage = Rc::new(MemoryStore::new());
    if let Some(user_id) = user {
        let token = token_expiring_at(NOW_MS / 1000 + 3600, &user_id.to_string());
        let _ = storage.set("cinevault.token", &token);
        let _ = storage.set("cinevault.user", &user_value(user_id).to_string());
    }
    let session = Rc::new(SessionManager::new(
        TokenStore::new(storage, &ClientConfig::default()),
        Rc::new(FixedClock::new(NOW_MS)),
        ApiClient::new(transport.clone()),
    ));
    session.restore_from_storage();
    session
}
