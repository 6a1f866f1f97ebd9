//! Client configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use std::env;
use std::path::PathBuf;

/// Client configuration
///
/// Controls where the client connects, how long it waits, and where the
/// session files live on disk.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the Omnia backend (scheme + host + port)
    pub base_url: String,
    /// Path prefix under which the API is mounted
    pub api_prefix: String,
    /// Per-request timeout (in seconds)
    pub request_timeout_secs: u64,
    /// Directory for persisted session state
    pub data_dir: PathBuf,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            base_url: env::var("OMNIA_BACKEND_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            api_prefix: env::var("OMNIA_API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            request_timeout_secs: env::var("OMNIA_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(30),
            data_dir: env::var("OMNIA_DATA_DIR").map(PathBuf::from).unwrap_or_else(|_| {
                // Default to ~/.omnia-client or the current directory
                if let Some(home) = env::var_os("HOME") {
                    let mut path = PathBuf::from(home);
                    path.push(".omnia-client");
                    path
                } else {
                    PathBuf::from(".omnia-client")
                }
            }),
        }
    }

    /// Create a configuration pointing at a specific backend URL
    ///
    /// Keeps the remaining fields at their environment-derived defaults.
    /// Primarily useful for tests and tools that talk to a non-default host.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::from_env()
        }
    }

    /// Full API root: base URL joined with the API prefix
    pub fn api_url(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.api_prefix
        )
    }
}
