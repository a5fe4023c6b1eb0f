//! Vision provider configuration parsed from environment variables.

use std::time::Duration;

use super::types::VisionError;
use crate::config::env_parse;

pub const API_KEY_VAR: &str = "GOOGLE_GENAI_API_KEY";
pub const DEFAULT_VISION_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_VISION_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_VISION_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_VISION_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisionTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl VisionTimeouts {
    #[must_use]
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

impl Default for VisionTimeouts {
    fn default() -> Self {
        Self {
            request_secs: DEFAULT_VISION_REQUEST_TIMEOUT_SECS,
            connect_secs: DEFAULT_VISION_CONNECT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisionConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeouts: VisionTimeouts,
}

impl VisionConfig {
    /// Build typed vision config from environment variables.
    ///
    /// Required:
    /// - `GOOGLE_GENAI_API_KEY`
    ///
    /// Optional:
    /// - `VISION_MODEL`: default `gemini-2.0-flash`
    /// - `VISION_BASE_URL`: default Generative Language API base URL
    /// - `VISION_REQUEST_TIMEOUT_SECS`: default 120
    /// - `VISION_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`VisionError::MissingApiKey`] when the key is absent or blank.
    pub fn from_env() -> Result<Self, VisionError> {
        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| VisionError::MissingApiKey { var: API_KEY_VAR.into() })?;

        let model = std::env::var("VISION_MODEL")
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_VISION_MODEL.to_string());
        let base_url = std::env::var("VISION_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_VISION_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let timeouts = VisionTimeouts {
            request_secs: env_parse("VISION_REQUEST_TIMEOUT_SECS", DEFAULT_VISION_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse("VISION_CONNECT_TIMEOUT_SECS", DEFAULT_VISION_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { api_key, model, base_url, timeouts })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
