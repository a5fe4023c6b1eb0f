//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the credential store, one pooled HTTP client for canvas calls, and
//! the optional vision extractor. Handlers never share a `CanvasClient`:
//! each request builds one from a credentials snapshot.

use std::sync::Arc;

use crate::canvas::{CanvasClient, CanvasError, build_http_client};
use crate::config::{AppConfig, CanvasTimeouts, CredentialStore};
use crate::vision::NoteExtractor;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub credentials: CredentialStore,
    pub http: reqwest::Client,
    pub canvas_timeouts: CanvasTimeouts,
    /// Optional vision extractor. `None` if vision env vars are not configured.
    pub extractor: Option<Arc<dyn NoteExtractor>>,
}

impl AppState {
    /// # Errors
    ///
    /// Returns [`CanvasError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(config: &AppConfig, extractor: Option<Arc<dyn NoteExtractor>>) -> Result<Self, CanvasError> {
        Ok(Self {
            credentials: CredentialStore::new(config.credentials.clone()),
            http: build_http_client(config.canvas_timeouts)?,
            canvas_timeouts: config.canvas_timeouts,
            extractor,
        })
    }

    /// Client bound to the credentials current at call time.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::CredentialsNotSet`] before any network call when
    /// the server or key is blank.
    pub async fn canvas_client(&self) -> Result<CanvasClient, CanvasError> {
        let credentials = self.credentials.get().await;
        CanvasClient::new(self.http.clone(), credentials, self.canvas_timeouts.request())
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
