//! Gemini `generateContent` client for sticky-note extraction.
//!
//! DESIGN
//! ======
//! One request per photo: a fixed instruction prompt plus the image as
//! base64 inline data, with controlled generation (`responseMimeType` and a
//! `responseSchema`) so the model answers with a bare JSON array. Models
//! still occasionally wrap the array in a Markdown fence, so parsing strips
//! fences before decoding. Parsing is pure (`parse_response`) for tests.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use super::config::VisionConfig;
use super::types::{NoteExtractor, VisionError};
use crate::mapping::Detection;

const API_KEY_HEADER: &str = "x-goog-api-key";

const PROMPT: &str = "\
Analyze the image for post-it notes. For each note extract its text, its \
background color as a hex code, its size in pixels, and the precise pixel \
location of its top-left corner ('x', 'y'). Relative position and size within \
the image frame matter; location is the most important field.

Return a JSON array. Each object has this structure:
{
  \"background_color\": \"<hex_code>\",
  \"location\": {\"x\": <pixel>, \"y\": <pixel>},
  \"scale\": <float>,
  \"size\": {\"height\": <pixel>, \"width\": <pixel>},
  \"state\": \"normal\",
  \"text\": \"<extracted_text>\",
  \"widget_type\": \"Note\"
}";

// =============================================================================
// CLIENT
// =============================================================================

pub struct GeminiExtractor {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GeminiExtractor {
    /// Build an extractor with its own timed HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`VisionError::HttpClientBuild`] if the client fails to build.
    pub fn new(config: VisionConfig) -> Result<Self, VisionError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeouts.request())
            .connect_timeout(config.timeouts.connect())
            .build()
            .map_err(|e| VisionError::HttpClientBuild(e.to_string()))?;
        let endpoint = format!("{}/models/{}:generateContent", config.base_url.trim_end_matches('/'), config.model);
        Ok(Self { http, endpoint, api_key: config.api_key })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl NoteExtractor for GeminiExtractor {
    async fn extract(&self, image: &[u8], mime_type: &str) -> Result<Vec<Detection>, VisionError> {
        let body = build_request(image, mime_type);
        info!(bytes = image.len(), mime_type, "vision: extracting notes");

        let response = self
            .http
            .post(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| VisionError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| VisionError::ApiRequest(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(VisionError::ApiResponse { status, body: text });
        }
        debug!(body = %text, "vision: raw response");

        let notes = parse_response(&text)?;
        info!(count = notes.len(), "vision: notes extracted");
        Ok(notes)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

pub(crate) fn build_request(image: &[u8], mime_type: &str) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [
                { "text": PROMPT },
                { "inlineData": { "mimeType": mime_type, "data": STANDARD.encode(image) } }
            ]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema()
        }
    })
}

fn response_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "background_color": { "type": "STRING" },
                "location": {
                    "type": "OBJECT",
                    "properties": { "x": { "type": "INTEGER" }, "y": { "type": "INTEGER" } },
                    "required": ["x", "y"]
                },
                "scale": { "type": "NUMBER" },
                "size": {
                    "type": "OBJECT",
                    "properties": { "height": { "type": "INTEGER" }, "width": { "type": "INTEGER" } },
                    "required": ["height", "width"]
                },
                "text": { "type": "STRING" },
                "widget_type": { "type": "STRING" }
            },
            "required": ["background_color", "location", "scale", "size", "text", "widget_type"]
        }
    })
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

// =============================================================================
// PARSING
// =============================================================================

/// Decode the first non-empty note array found in any candidate text part.
///
/// A valid but empty array means the photo holds no notes and yields an
/// empty list; no array at all is [`VisionError::NoNoteArray`].
pub(crate) fn parse_response(json: &str) -> Result<Vec<Detection>, VisionError> {
    let api: ApiResponse = serde_json::from_str(json).map_err(|e| VisionError::ApiParse(e.to_string()))?;

    let mut saw_empty = false;
    let texts = api
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .filter_map(|p| p.text);
    for text in texts {
        match serde_json::from_str::<Vec<Detection>>(extract_json_from_markdown(&text)) {
            Ok(notes) if !notes.is_empty() => return Ok(notes),
            Ok(_) => saw_empty = true,
            Err(e) => debug!(error = %e, "vision: part is not a note array"),
        }
    }

    if saw_empty { Ok(Vec::new()) } else { Err(VisionError::NoNoteArray) }
}

/// Strip an optional ```` ```json ```` / ```` ``` ```` fence around `s`.
pub(crate) fn extract_json_from_markdown(s: &str) -> &str {
    let s = s.trim();
    let s = s
        .strip_prefix("```json")
        .or_else(|| s.strip_prefix("```"))
        .unwrap_or(s);
    let s = s.strip_suffix("```").unwrap_or(s);
    s.trim()
}

#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;
