//! Session lifecycle management
//!
//! Owns the identity/credential state machine (login, register, logout,
//! restore-on-start) and the on-disk store backing it.

mod manager;
mod persistence;

pub use manager::SessionManager;
pub use persistence::{PersistenceError, SessionStore};
