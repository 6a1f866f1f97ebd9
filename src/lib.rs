//! Omnia Client Library
//!
//! Async client SDK for the Omnia agent/task/tool management API. It covers
//! the session lifecycle (login, register, logout, restore-on-start) and
//! per-entity resource stores that keep a local cache consistent with the
//! remote API through explicit CRUD calls.
//!
//! The [`OmniaClient`] facade wires the pieces together with an explicit
//! init/teardown lifecycle; there is no ambient global state. Consumers hold
//! the instance and pass its parts where needed.
//!
//! ```no_run
//! use omnia_client::OmniaClient;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let client = OmniaClient::from_env()?;
//! client.session().login("a@x.com", "pw").await?;
//! client.tasks().activate().await?;
//! for task in client.tasks().items() {
//!     println!("{}: {:?}", task.title, task.status);
//! }
//! client.close();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod models;
/// Session lifecycle management
///
/// Handles login/register/logout, restore-on-start, and the persisted
/// credential + identity slots.
pub mod session;
pub mod store;

use std::sync::Arc;

pub use config::ClientConfig;
pub use error::{ClientError, OperationError};
pub use http::{HttpClient, Payload};
pub use session::SessionManager;
pub use store::{Action, AgentStore, Resource, ResourceStore, TaskStore, ToolStore};

use session::SessionStore;

/// Entry point wiring config, session, and the three resource stores
///
/// Construction restores any persisted session, so the very first request
/// after startup already carries the stored credential. [`close`] tears
/// everything down, aborting in-flight calls.
///
/// [`close`]: OmniaClient::close
#[derive(Debug)]
pub struct OmniaClient {
    session: SessionManager,
    agents: AgentStore,
    tasks: TaskStore,
    tools: ToolStore,
}

impl OmniaClient {
    /// Build a client from explicit configuration
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let store = Arc::new(SessionStore::new(&config.data_dir));
        let http = Arc::new(HttpClient::new(&config, Arc::clone(&store))?);

        let session = SessionManager::new(Arc::clone(&http), store);
        let _ = session.restore();

        Ok(Self {
            session,
            agents: ResourceStore::new(Arc::clone(&http)),
            tasks: ResourceStore::new(Arc::clone(&http)),
            tools: ResourceStore::new(http),
        })
    }

    /// Build a client from environment variables
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(ClientConfig::from_env())
    }

    /// The session manager
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// The agent store
    pub fn agents(&self) -> &AgentStore {
        &self.agents
    }

    /// The task store
    pub fn tasks(&self) -> &TaskStore {
        &self.tasks
    }

    /// The tool store
    pub fn tools(&self) -> &ToolStore {
        &self.tools
    }

    /// Tear down the session and all stores
    ///
    /// In-flight operations resolve `Cancelled` and apply no further state
    /// updates. Dropping the client has the same effect.
    pub fn close(&self) {
        self.session.close();
        self.agents.close();
        self.tasks.close();
        self.tools.close();
    }
}
