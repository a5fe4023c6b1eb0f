//! Process configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! Canvas credentials are the only runtime-mutable setting: the web UI can
//! replace them at any time. They live in a `CredentialStore` owned by
//! `AppState`; every request takes a snapshot and hands it to the canvas
//! client constructor, so no component below the HTTP layer touches the
//! shared lock.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::canvas::CanvasError;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_CANVAS_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CANVAS_CONNECT_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// CREDENTIALS
// =============================================================================

/// Canvas server base URL and static API key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanvasCredentials {
    pub server: String,
    pub api_key: String,
}

impl CanvasCredentials {
    #[must_use]
    pub fn new(server: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self { server: server.into(), api_key: api_key.into() }
    }

    /// `true` when both the server and the key are non-empty.
    #[must_use]
    pub fn is_set(&self) -> bool {
        !self.server.trim().is_empty() && !self.api_key.trim().is_empty()
    }

    /// Return `self` if usable, otherwise `CredentialsNotSet`.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::CredentialsNotSet`] when either value is blank.
    pub fn require(self) -> Result<Self, CanvasError> {
        if self.is_set() { Ok(self) } else { Err(CanvasError::CredentialsNotSet) }
    }
}

/// Thread-safe holder for the current credentials.
///
/// Reads return an owned copy, so a handler never observes a half-applied
/// update.
#[derive(Clone, Default)]
pub struct CredentialStore {
    inner: Arc<RwLock<CanvasCredentials>>,
}

impl CredentialStore {
    #[must_use]
    pub fn new(initial: CanvasCredentials) -> Self {
        Self { inner: Arc::new(RwLock::new(initial)) }
    }

    pub async fn get(&self) -> CanvasCredentials {
        self.inner.read().await.clone()
    }

    pub async fn set(&self, credentials: CanvasCredentials) {
        *self.inner.write().await = credentials;
    }
}

// =============================================================================
// APP CONFIG
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl CanvasTimeouts {
    #[must_use]
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

impl Default for CanvasTimeouts {
    fn default() -> Self {
        Self {
            request_secs: DEFAULT_CANVAS_REQUEST_TIMEOUT_SECS,
            connect_secs: DEFAULT_CANVAS_CONNECT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub credentials: CanvasCredentials,
    pub canvas_timeouts: CanvasTimeouts,
}

impl AppConfig {
    /// Build typed app config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 8080
    /// - `CANVUS_SERVER`, `CANVUS_API_KEY`: initial canvas credentials
    /// - `CANVAS_REQUEST_TIMEOUT_SECS`: default 30
    /// - `CANVAS_CONNECT_TIMEOUT_SECS`: default 10
    #[must_use]
    pub fn from_env() -> Self {
        let credentials = CanvasCredentials {
            server: std::env::var("CANVUS_SERVER").unwrap_or_default(),
            api_key: std::env::var("CANVUS_API_KEY").unwrap_or_default(),
        };
        let canvas_timeouts = CanvasTimeouts {
            request_secs: env_parse("CANVAS_REQUEST_TIMEOUT_SECS", DEFAULT_CANVAS_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse("CANVAS_CONNECT_TIMEOUT_SECS", DEFAULT_CANVAS_CONNECT_TIMEOUT_SECS),
        };

        Self { port: env_parse("PORT", DEFAULT_PORT), credentials, canvas_timeouts }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
