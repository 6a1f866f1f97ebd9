// Session persistence module
// Handles saving and loading the credential and identity slots on disk

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::models::{Identity, Token};

/// Error types for persistence operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistenceError {
    /// File I/O error
    #[error("IO Error: {0}")]
    Io(String),
    /// JSON serialization/deserialization error
    #[error("JSON Error: {0}")]
    Json(String),
}

/// On-disk store for the persisted session
///
/// Two named slots live in the data directory: `credential.json` (the
/// serialized bearer token) and `identity.json` (the identity snapshot).
/// The slots are always written together and cleared together; a session
/// with only one slot present is treated as no session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    data_dir: PathBuf,
}

const CREDENTIAL_FILE: &str = "credential.json";
const IDENTITY_FILE: &str = "identity.json";

impl SessionStore {
    /// Create a store rooted at the given data directory
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    fn credential_path(&self) -> PathBuf {
        self.data_dir.join(CREDENTIAL_FILE)
    }

    fn identity_path(&self) -> PathBuf {
        self.data_dir.join(IDENTITY_FILE)
    }

    /// Persist both slots
    ///
    /// Creates the data directory if needed. Both files are written in one
    /// call so the slots are never independently present.
    pub fn save(&self, token: &Token, identity: &Identity) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.data_dir).map_err(|e| PersistenceError::Io(e.to_string()))?;

        let token_json =
            serde_json::to_string_pretty(token).map_err(|e| PersistenceError::Json(e.to_string()))?;
        let identity_json = serde_json::to_string_pretty(identity)
            .map_err(|e| PersistenceError::Json(e.to_string()))?;

        fs::write(self.credential_path(), token_json)
            .map_err(|e| PersistenceError::Io(e.to_string()))?;
        fs::write(self.identity_path(), identity_json)
            .map_err(|e| PersistenceError::Io(e.to_string()))?;

        Ok(())
    }

    /// Clear both slots
    ///
    /// Idempotent: missing files are not an error.
    pub fn clear(&self) {
        for path in [self.credential_path(), self.identity_path()] {
            if let Err(e) = fs::remove_file(&path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %path.display(), error = %e, "Failed to remove session file");
                }
            }
        }
    }

    /// Load the persisted session, if a complete and parseable one exists
    ///
    /// A half-present or corrupted session is treated as no session: it is
    /// logged, the slots are cleared, and `None` is returned. This never
    /// surfaces an error to the caller.
    pub fn load(&self) -> Option<(Token, Identity)> {
        let token_json = match fs::read_to_string(self.credential_path()) {
            Ok(json) => json,
            Err(_) => return None,
        };
        let identity_json = match fs::read_to_string(self.identity_path()) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Credential slot present without identity slot, clearing session");
                self.clear();
                return None;
            }
        };

        let token: Token = match serde_json::from_str(&token_json) {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to parse persisted credential, clearing session");
                self.clear();
                return None;
            }
        };
        let identity: Identity = match serde_json::from_str(&identity_json) {
            Ok(identity) => identity,
            Err(e) => {
                warn!(error = %e, "Failed to parse persisted identity, clearing session");
                self.clear();
                return None;
            }
        };

        Some((token, identity))
    }

    /// Re-read just the credential slot
    ///
    /// Called before every outbound request so that a logout is honored
    /// immediately; no in-memory copy of the token is kept.
    pub fn load_credential(&self) -> Option<String> {
        let json = fs::read_to_string(self.credential_path()).ok()?;
        match serde_json::from_str::<Token>(&json) {
            Ok(token) => Some(token.access_token),
            Err(e) => {
                warn!(error = %e, "Failed to parse persisted credential");
                None
            }
        }
    }
}
