//! Authentication lifecycle and the shared session context.
//!
//! # Design
//! - One `SessionManager` per running client, passed around by `Rc`; nothing else
//!   writes session state.
//! - `Session` stores only the optional user; "authenticated" is derived from it, so
//!   the two can never be observed out of step.
//! - Auth calls go through an un-intercepted client; they must never carry a bearer.
//! - Restoration is all-or-nothing: any missing, corrupt, expired or mismatched piece
//!   of persisted state forces a logout.

use std::fmt;
use std::rc::Rc;

use cinevault_api_models::{AuthResponse, LoginRequest, RegisterRequest, UserProfile};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::clock::Clock;
use crate::core::store::{StateCell, Subscription, TokenStore};
use crate::core::token;
use crate::services::api::{ApiClient, ApiError};

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const EMAIL_TAKEN: &str = "An account with this email already exists";
const VALIDATION: &str = "Please check the highlighted fields and try again";
const NETWORK: &str = "Unable to reach the server. Please try again.";
const STORAGE: &str = "Unable to save your session. Check that site storage is enabled.";

/// Snapshot of who is signed in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<UserProfile>,
}

impl Session {
    /// Anonymous session.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { user: None }
    }

    /// Signed-in user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// Whether a user is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Name for headers and menus; falls back to the email when the name is blank.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.user.as_ref().map(|user| {
            let name = user.full_name.trim();
            if name.is_empty() { user.email.as_str() } else { name }
        })
    }
}

/// Failure of login or registration, carrying a displayable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Email/password pair rejected.
    #[error("{0}")]
    InvalidCredentials(String),
    /// Registration email already in use.
    #[error("{0}")]
    EmailTaken(String),
    /// Registration payload rejected by server-side validation.
    #[error("{0}")]
    Validation(String),
    /// No usable response (offline, server error, unexpected body), or the
    /// session could not be saved locally.
    #[error("{0}")]
    Network(String),
}

impl AuthError {
    /// Message suitable for display next to the form.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::InvalidCredentials(message)
            | Self::EmailTaken(message)
            | Self::Validation(message)
            | Self::Network(message) => message,
        }
    }

    fn from_api(err: &ApiError) -> Self {
        let server = err.server_message().map(str::to_string);
        match err.status() {
            Some(401) => Self::InvalidCredentials(server.unwrap_or_else(|| INVALID_CREDENTIALS.into())),
            Some(409) => Self::EmailTaken(server.unwrap_or_else(|| EMAIL_TAKEN.into())),
            Some(400 | 422) => Self::Validation(server.unwrap_or_else(|| VALIDATION.into())),
            _ => Self::Network(server.unwrap_or_else(|| NETWORK.into())),
        }
    }
}

/// Result of the registration email hint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmailAvailability {
    /// No account uses the email.
    Available,
    /// An account already uses the email.
    Taken,
    /// The check could not be completed.
    Unknown,
}

/// Owner of authentication state.
pub struct SessionManager {
    tokens: TokenStore,
    clock: Rc<dyn Clock>,
    auth_api: ApiClient,
    state: StateCell<Session>,
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("tokens", &self.tokens)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Build an anonymous session manager.
    ///
    /// `auth_api` must not route through the auth interceptor.
    #[must_use]
    pub fn new(tokens: TokenStore, clock: Rc<dyn Clock>, auth_api: ApiClient) -> Self {
        Self {
            tokens,
            clock,
            auth_api,
            state: StateCell::new(Session::anonymous()),
        }
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] on 401 and [`AuthError::Network`]
    /// when the server is unreachable or fails, or when the token cannot be stored.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        match self.auth_api.login(&request).await {
            Ok(response) => self.establish(response),
            Err(err) => {
                warn!(error = %err, "login failed");
                Err(AuthError::from_api(&err))
            }
        }
    }

    /// Create an account and sign in as it.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EmailTaken`] on 409, [`AuthError::Validation`] on 400/422
    /// and [`AuthError::Network`] otherwise, including when the token cannot be stored.
    pub async fn register(&self, profile: RegisterRequest) -> Result<Session, AuthError> {
        match self.auth_api.register(&profile).await {
            Ok(response) => self.establish(response),
            Err(err) => {
                warn!(error = %err, "registration failed");
                Err(AuthError::from_api(&err))
            }
        }
    }

    /// Advisory availability check for the registration form.
    pub async fn check_email_availability(&self, email: &str) -> EmailAvailability {
        match self.auth_api.email_exists(email.trim()).await {
            Ok(true) => EmailAvailability::Taken,
            Ok(false) => EmailAvailability::Available,
            Err(err) => {
                debug!(error = %err, "email availability unknown");
                EmailAvailability::Unknown
            }
        }
    }

    /// Clear persisted credentials and become anonymous. Safe to repeat.
    pub fn logout(&self) {
        self.tokens.clear();
        if self.state.with(Session::is_authenticated) {
            self.state.set(Session::anonymous());
            info!("session ended");
        }
    }

    /// Persisted bearer token, if any.
    #[must_use]
    pub fn current_token(&self) -> Option<String> {
        self.tokens.token()
    }

    /// Whether the persisted token is absent, undecodable or past its expiry.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        token::is_expired(self.current_token().as_deref(), self.clock.now_ms())
    }

    /// Rebuild the session from storage at startup. Returns whether a user was
    /// restored; every other outcome leaves the client logged out.
    pub fn restore_from_storage(&self) -> bool {
        match self.stored_user() {
            Some(user) => {
                info!(user_id = %user.id, "session restored");
                self.state.set(Session { user: Some(user) });
                true
            }
            None => {
                self.logout();
                false
            }
        }
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.state.get()
    }

    /// Whether a user is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.with(Session::is_authenticated)
    }

    /// Signed-in user's profile.
    #[must_use]
    pub fn current_user(&self) -> Option<UserProfile> {
        self.state.with(|session| session.user.clone())
    }

    /// Observe session transitions.
    pub fn subscribe(&self, listener: impl Fn(&Session) + 'static) -> Subscription {
        self.state.subscribe(listener)
    }

    /// The session becomes authenticated only after the token pair is stored.
    fn establish(&self, response: AuthResponse) -> Result<Session, AuthError> {
        let user_json = serde_json::to_string(&response.user).map_err(|err| {
            warn!(error = %err, "failed to serialise user profile");
            AuthError::Network(STORAGE.into())
        })?;
        self.tokens
            .save(&response.token, &user_json)
            .map_err(|_| AuthError::Network(STORAGE.into()))?;
        info!(user_id = %response.user.id, "session started");
        let session = Session {
            user: Some(response.user),
        };
        self.state.set(session.clone());
        Ok(session)
    }

    fn stored_user(&self) -> Option<UserProfile> {
        let token = self.tokens.token()?;
        let claims = match token::check(&token, self.clock.now_ms()) {
            Ok(claims) => claims,
            Err(err) => {
                debug!(error = %err, "stored token rejected");
                return None;
            }
        };
        let user: UserProfile = match serde_json::from_str(&self.tokens.user_json()?) {
            Ok(user) => user,
            Err(err) => {
                debug!(error = %err, "stored user profile unreadable");
                return None;
            }
        };
        match claims.sub {
            Some(subject) if subject != user.id.to_string() => {
                debug!("stored token belongs to a different user");
                None
            }
            _ => Some(user),
        }
    }
}
