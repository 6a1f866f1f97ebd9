//! Client-side resource stores
//!
//! A [`ResourceStore`] is the cache + CRUD façade for one entity kind. It
//! owns an ordered sequence of entities plus store-wide `loading`/`error`
//! flags, and mutates the cache only after the server has confirmed the
//! corresponding remote change. The cache is a soft, eventually-stale view;
//! nothing re-syncs it except an explicit refetch.

mod resources;

pub use resources::{AgentStore, TaskStore, ToolStore};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{ClientError, OperationError};
use crate::http::{HttpClient, Payload};

/// An entity kind a [`ResourceStore`] can manage
pub trait Resource: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    /// Plural collection segment in the API path (e.g. `agents`)
    const COLLECTION: &'static str;
    /// Singular name used in error messages (e.g. `agent`)
    const LABEL: &'static str;
    /// Payload accepted by the create endpoint
    type CreateInput: Serialize + Send + Sync;

    /// Unique id of the entity
    fn id(&self) -> &str;

    /// Validate an entity decoded from a server payload
    fn validate(&self) -> Result<(), String>;
}

/// HTTP method of a server-side action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionMethod {
    /// POST with an empty JSON body
    Post,
    /// DELETE (the server's convention for task cancellation)
    Delete,
}

/// A server-side action applied to one entity
///
/// The action's response is the updated entity, which replaces the cached
/// one in place.
#[derive(Debug, Clone, Copy)]
pub struct Action {
    /// HTTP method the action is expressed as
    pub method: ActionMethod,
    /// Optional path segment appended after the entity id
    pub subpath: Option<&'static str>,
    /// Verb used in error messages (e.g. `cancel`)
    pub verb: &'static str,
}

impl Action {
    /// Cancel an entity: the DELETE verb returning the updated record
    pub const fn cancel() -> Self {
        Self {
            method: ActionMethod::Delete,
            subpath: None,
            verb: "cancel",
        }
    }
}

#[derive(Debug)]
struct StoreState<T> {
    items: Vec<T>,
    loading: bool,
    error: Option<String>,
}

impl<T> Default for StoreState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
        }
    }
}

/// Cache + CRUD façade for one entity kind
///
/// `loading` and `error` are store-wide, not per-operation: concurrent
/// operations share them, and whichever operation finishes last determines
/// the final value. Completion order of concurrent calls is not guaranteed;
/// the cache reflects whichever resolves last.
#[derive(Debug)]
pub struct ResourceStore<T: Resource> {
    http: Arc<HttpClient>,
    state: Mutex<StoreState<T>>,
    activated: AtomicBool,
    cancel: CancellationToken,
}

impl<T: Resource> ResourceStore<T> {
    /// Create an empty, not-yet-activated store
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self {
            http,
            state: Mutex::new(StoreState::default()),
            activated: AtomicBool::new(false),
            cancel: CancellationToken::new(),
        }
    }

    /// Activate the store
    ///
    /// The first call performs the one automatic [`fetch_all`] that
    /// establishes the initial cache; later calls are no-ops. Nothing
    /// re-triggers the fetch afterwards.
    ///
    /// [`fetch_all`]: ResourceStore::fetch_all
    pub async fn activate(&self) -> Result<(), OperationError> {
        if self.activated.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.fetch_all().await
    }

    /// Replace the cache wholesale with the server's current list
    ///
    /// On failure the stale cache is left untouched and `error` is set.
    pub async fn fetch_all(&self) -> Result<(), OperationError> {
        let _guard = self.begin();
        let fallback = format!("Failed to fetch {}", T::COLLECTION);

        let path = format!("/{}", T::COLLECTION);
        let items: Vec<T> = self
            .http
            .get(&path, &self.cancel)
            .await
            .and_then(validate_all)
            .map_err(|e| self.fail(e, &fallback))?;

        debug!(collection = T::COLLECTION, count = items.len(), "Replaced cache from fetch");
        self.state().items = items;
        Ok(())
    }

    /// Fetch a single entity by id
    ///
    /// Read-through: the cache is not consulted and not mutated.
    pub async fn fetch_one(&self, id: &str) -> Result<T, OperationError> {
        let _guard = self.begin();
        let fallback = format!("Failed to fetch {}", T::LABEL);

        let path = format!("/{}/{}", T::COLLECTION, id);
        self.http
            .get(&path, &self.cancel)
            .await
            .and_then(validate_one)
            .map_err(|e| self.fail(e, &fallback))
    }

    /// Create a new entity
    ///
    /// On success the server-returned entity is appended to the tail of the
    /// cache; on failure the cache is unchanged.
    pub async fn create(&self, input: &T::CreateInput) -> Result<T, OperationError> {
        let _guard = self.begin();
        let fallback = format!("Failed to create {}", T::LABEL);

        let path = format!("/{}", T::COLLECTION);
        let body = serde_json::to_value(input)
            .map_err(ClientError::from)
            .map_err(|e| self.fail(e, &fallback))?;
        let created: T = self
            .http
            .post(&path, Payload::Json(body), &self.cancel)
            .await
            .and_then(validate_one)
            .map_err(|e| self.fail(e, &fallback))?;

        debug!(collection = T::COLLECTION, id = created.id(), "Created entity");
        let mut state = self.state();
        // A same-id duplicate must never enter the cache
        match state.items.iter().position(|item| item.id() == created.id()) {
            Some(position) => state.items[position] = created.clone(),
            None => state.items.push(created.clone()),
        }
        Ok(created)
    }

    /// Delete an entity
    ///
    /// The remote delete happens first; only confirmed success removes the
    /// cached entry. Deleting an id the server does not know fails.
    pub async fn delete(&self, id: &str) -> Result<(), OperationError> {
        let _guard = self.begin();
        let fallback = format!("Failed to delete {}", T::LABEL);

        let path = format!("/{}/{}", T::COLLECTION, id);
        let _: serde_json::Value = self
            .http
            .delete(&path, &self.cancel)
            .await
            .map_err(|e| self.fail(e, &fallback))?;

        debug!(collection = T::COLLECTION, id = id, "Deleted entity");
        self.state().items.retain(|item| item.id() != id);
        Ok(())
    }

    /// Apply a server-side action to one entity
    ///
    /// On success the returned entity replaces the cached one with the
    /// matching id, preserving its position in the sequence.
    pub async fn update_by_action(&self, id: &str, action: Action) -> Result<T, OperationError> {
        let _guard = self.begin();
        let fallback = format!("Failed to {} {}", action.verb, T::LABEL);

        let path = match action.subpath {
            Some(subpath) => format!("/{}/{}/{}", T::COLLECTION, id, subpath),
            None => format!("/{}/{}", T::COLLECTION, id),
        };
        let result = match action.method {
            ActionMethod::Post => {
                self.http
                    .post(&path, Payload::Json(serde_json::json!({})), &self.cancel)
                    .await
            }
            ActionMethod::Delete => self.http.delete(&path, &self.cancel).await,
        };
        let updated: T = result
            .and_then(validate_one)
            .map_err(|e| self.fail(e, &fallback))?;

        let mut state = self.state();
        if let Some(position) = state.items.iter().position(|item| item.id() == id) {
            state.items[position] = updated.clone();
        }
        debug!(collection = T::COLLECTION, id = id, verb = action.verb, "Applied action");
        Ok(updated)
    }

    /// Current cache contents, in sequence order
    pub fn items(&self) -> Vec<T> {
        self.state().items.clone()
    }

    /// Whether any operation on this store is in flight
    pub fn loading(&self) -> bool {
        self.state().loading
    }

    /// Message of the most recent failure, if any
    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    /// Tear the store down, aborting any in-flight operations
    ///
    /// Pending calls resolve `Cancelled` and apply no cache mutation.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    fn state(&self) -> MutexGuard<'_, StoreState<T>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Bracket an operation: loading is set now and reset on every exit path
    fn begin(&self) -> LoadingGuard<'_, T> {
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

impl<T: Resource> Drop for ResourceStore<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct LoadingGuard<'a, T> {
    state: &'a Mutex<StoreState<T>>,
}

impl<T> Drop for LoadingGuard<'_, T> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            state.loading = false;
        }
    }
}

fn validate_one<T: Resource>(entity: T) -> Result<T, ClientError> {
    entity
        .validate()
        .map_err(ClientError::InvalidEntity)
        .map(|_| entity)
}

fn validate_all<T: Resource>(items: Vec<T>) -> Result<Vec<T>, ClientError> {
    for item in &items {
        item.validate().map_err(ClientError::InvalidEntity)?;
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::models::Agent;
    use crate::session::SessionStore;
    use mockito::Server;
    use serial_test::serial;
    use tempfile::TempDir;

    fn store_for(server: &Server, dir: &TempDir) -> ResourceStore<Agent> {
        let session = Arc::new(SessionStore::new(dir.path()));
        let config = ClientConfig {
            base_url: server.url(),
            api_prefix: "/api".to_string(),
            request_timeout_secs: 5,
            data_dir: dir.path().to_path_buf(),
        };
        let http = Arc::new(HttpClient::new(&config, session).unwrap());
        ResourceStore::new(http)
    }

    const AGENT_LIST: &str = r#"[
        {"id": "a1", "name": "Alpha", "type": "cloud", "owner_id": "u1"},
        {"id": "a2", "name": "Beta", "type": "local", "owner_id": "u1"}
    ]"#;

    #[tokio::test]
    #[serial]
    async fn test_activate_fetches_exactly_once() {
        let mut server = Server::new_async().await;
        let dir = TempDir::new().unwrap();
        let store = store_for(&server, &dir);

        let mock = server
            .mock("GET", "/api/agents")
            .with_status(200)
            .with_body(AGENT_LIST)
            .expect(1)
            .create_async()
            .await;

        store.activate().await.unwrap();
        store.activate().await.unwrap();
        mock.assert_async().await;
        assert_eq!(store.items().len(), 2);
    }

    #[tokio::test]
    #[serial]
    async fn test_fetch_all_failure_keeps_stale_cache() {
        let mut server = Server::new_async().await;
        let dir = TempDir::new().unwrap();
        let store = store_for(&server, &dir);

        let ok = server
            .mock("GET", "/api/agents")
            .with_status(200)
            .with_body(AGENT_LIST)
            .expect(1)
            .create_async()
            .await;
        store.fetch_all().await.unwrap();
        ok.assert_async().await;
        ok.remove_async().await;

        let failing = server
            .mock("GET", "/api/agents")
            .with_status(500)
            .with_body(r#"{"detail": "backend down"}"#)
            .create_async()
            .await;
        let err = store.fetch_all().await.unwrap_err();
        failing.assert_async().await;

        // Stale-but-available: the previous cache survives the failure
        assert_eq!(store.items().len(), 2);
        assert_eq!(err.message, "backend down");
        assert_eq!(store.error().as_deref(), Some("backend down"));
        assert!(!store.loading());
    }

    #[tokio::test]
    #[serial]
    async fn test_malformed_entity_rejected_by_validation() {
        let mut server = Server::new_async().await;
        let dir = TempDir::new().unwrap();
        let store = store_for(&server, &dir);

        // Well-formed JSON, but an empty name fails domain validation
        let mock = server
            .mock("GET", "/api/agents")
            .with_status(200)
            .with_body(r#"[{"id": "a1", "name": "", "type": "cloud", "owner_id": "u1"}]"#)
            .create_async()
            .await;

        let err = store.fetch_all().await.unwrap_err();
        mock.assert_async().await;
        assert!(matches!(err.source, ClientError::InvalidEntity(_)));
        assert!(store.items().is_empty());
    }

    #[tokio::test]
    #[serial]
    async fn test_fetch_one_does_not_mutate_cache() {
        let mut server = Server::new_async().await;
        let dir = TempDir::new().unwrap();
        let store = store_for(&server, &dir);

        let mock = server
            .mock("GET", "/api/agents/a9")
            .with_status(200)
            .with_body(r#"{"id": "a9", "name": "Solo", "type": "hybrid", "owner_id": "u1"}"#)
            .create_async()
            .await;

        let agent = store.fetch_one("a9").await.unwrap();
        mock.assert_async().await;
        assert_eq!(agent.id, "a9");
        assert!(store.items().is_empty());
        assert!(!store.loading());
    }
}
