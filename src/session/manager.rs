// Session manager
// Unauthenticated <-> Authenticated state machine over the persisted store

use std::sync::{Arc, Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{ClientError, OperationError};
use crate::http::{HttpClient, Payload};
use crate::models::{Identity, Token, UserCreate, UserResponse};
use crate::session::SessionStore;

const LOGIN_FALLBACK: &str = "Login failed. Please check your credentials.";
const REGISTER_FALLBACK: &str = "Registration failed. Please try again.";

#[derive(Debug, Default)]
struct SessionState {
    identity: Option<Identity>,
    loading: bool,
    error: Option<String>,
}

/// Manages the current user's session
///
/// The session is authenticated iff an identity is held; there is no stored
/// `authenticated` flag. Login and register go through the remote API;
/// logout is purely local. Overlapping logins are serialized: a second call
/// queues behind the in-flight one rather than racing it into the persisted
/// store.
#[derive(Debug)]
pub struct SessionManager {
    http: Arc<HttpClient>,
    store: Arc<SessionStore>,
    state: Mutex<SessionState>,
    login_gate: tokio::sync::Mutex<()>,
    cancel: CancellationToken,
}

impl SessionManager {
    /// Create a manager over the given HTTP client and session store
    pub fn new(http: Arc<HttpClient>, store: Arc<SessionStore>) -> Self {
        Self {
            http,
            store,
            state: Mutex::new(SessionState::default()),
            login_gate: tokio::sync::Mutex::new(()),
            cancel: CancellationToken::new(),
        }
    }

    /// Restore a previously persisted session, if one exists
    ///
    /// Call once at startup. A missing, half-present, or unparseable session
    /// leaves the manager unauthenticated; this never fails.
    pub fn restore(&self) -> Option<Identity> {
        match self.store.load() {
            Some((_token, identity)) => {
                info!(username = %identity.username, "Restored persisted session");
                self.state().identity = Some(identity.clone());
                Some(identity)
            }
            None => {
                debug!("No persisted session to restore");
                self.state().identity = None;
                None
            }
        }
    }

    /// Log in with an email and password
    ///
    /// On success the credential and derived identity are persisted together
    /// and the manager becomes authenticated. On failure the state stays
    /// unauthenticated and the server's `detail` message (or a generic
    /// fallback) is reported on both the `error` field and the returned
    /// rejection.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, OperationError> {
        let _gate = self.login_gate.lock().await;
        let _guard = self.begin();

        match self.request_token(email, password).await {
            Ok(identity) => {
                info!(username = %identity.username, "Login succeeded");
                self.state().identity = Some(identity.clone());
                Ok(identity)
            }
            Err(e) => Err(self.fail(e, LOGIN_FALLBACK)),
        }
    }

    async fn request_token(&self, email: &str, password: &str) -> Result<Identity, ClientError> {
        let payload = Payload::Form(vec![
            ("username".to_string(), email.to_string()),
            ("password".to_string(), password.to_string()),
        ]);
        let token: Token = self.http.post("/auth/token", payload, &self.cancel).await?;
        debug!(token_type = %token.token_type, "Credential issued");

        let identity = Identity::from_email(email);
        // Both slots are written in one call, never independently
        self.store.save(&token, &identity)?;
        Ok(identity)
    }

    /// Register a new account, then log in with the same credentials
    ///
    /// The two stages fail distinctly: a registration failure carries the
    /// register endpoint's message, a failure in the chained login carries
    /// the login message.
    pub async fn register(&self, profile: UserCreate) -> Result<Identity, OperationError> {
        {
            let _guard = self.begin();
            let body = serde_json::to_value(&profile)
                .map_err(ClientError::from)
                .map_err(|e| self.fail(e, REGISTER_FALLBACK))?;
            let created: UserResponse = self
                .http
                .post("/auth/register", Payload::Json(body), &self.cancel)
                .await
                .map_err(|e| self.fail(e, REGISTER_FALLBACK))?;
            debug!(user_id = %created.id, username = %created.username, "Account registered");
        }

        self.login(&profile.email, &profile.password).await
    }

    /// Log out
    ///
    /// Synchronous and idempotent: clears both persisted slots and the
    /// in-memory identity. Issues no network call.
    pub fn logout(&self) {
        self.store.clear();
        self.state().identity = None;
        info!("Logged out");
    }

    /// Identity of the signed-in user, if authenticated
    pub fn identity(&self) -> Option<Identity> {
        self.state().identity.clone()
    }

    /// Whether a user is signed in (derived, never stored)
    pub fn is_authenticated(&self) -> bool {
        self.state().identity.is_some()
    }

    /// Whether a session operation is currently in flight
    pub fn loading(&self) -> bool {
        self.state().loading
    }

    /// Message of the most recent failure, if any
    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    /// Tear the session down, aborting any in-flight calls
    ///
    /// Pending operations resolve `Cancelled` and apply no state changes.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Bracket an operation: loading is set now and reset on every exit path
    fn begin(&self) -> LoadingGuard<'_> {
        let mut state = self.state();
        state.loading = true;
        state.error = None;
        drop(state);
        LoadingGuard { state: &self.state }
    }

    /// Record a failure on both channels with the same derived message
    ///
    /// Cancellation is a local teardown, not a server failure, so it does
    /// not touch the `error` field.
    fn fail(&self, source: ClientError, fallback: &str) -> OperationError {
        let op = OperationError::new(source, fallback);
        if !op.source.is_cancelled() {
            self.state().error = Some(op.message.clone());
        }
        op
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct LoadingGuard<'a> {
    state: &'a Mutex<SessionState>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            state.loading = false;
        }
    }
}
