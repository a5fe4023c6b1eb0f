use axum::http::{Method, StatusCode};

use super::*;
use crate::canvas::test_server::{MockCanvas, MockReply};
use crate::error::ErrorCode;
use crate::geometry::{PixelPoint, PixelSize};
use crate::vision::config::VisionTimeouts;

fn make_response(texts: &[&str]) -> String {
    let parts: Vec<Value> = texts.iter().map(|t| json!({ "text": t })).collect();
    json!({
        "candidates": [{ "content": { "role": "model", "parts": parts }, "finishReason": "STOP" }],
        "modelVersion": "gemini-2.0-flash"
    })
    .to_string()
}

const NOTE_ARRAY: &str = r##"[
  {"background_color": "#FF0000", "location": {"x": 100, "y": 30}, "scale": 1.0,
   "size": {"height": 40, "width": 60}, "state": "normal", "text": "Red Note", "widget_type": "Note"},
  {"background_color": "#00FF00", "location": {"x": 170, "y": 110}, "scale": 1.0,
   "size": {"height": 40, "width": 60}, "text": "Green Note", "widget_type": "Note"}
]"##;

fn config(base_url: &str) -> VisionConfig {
    VisionConfig {
        api_key: "g-key".into(),
        model: "gemini-test".into(),
        base_url: base_url.into(),
        timeouts: VisionTimeouts { request_secs: 5, connect_secs: 1 },
    }
}

// =========================================================================
// extract_json_from_markdown
// =========================================================================

#[test]
fn strips_json_fence() {
    assert_eq!(extract_json_from_markdown("```json\n[1]\n```"), "[1]");
}

#[test]
fn strips_bare_fence() {
    assert_eq!(extract_json_from_markdown("  ```\n[]\n```  "), "[]");
}

#[test]
fn leaves_unfenced_text() {
    assert_eq!(extract_json_from_markdown(" [ {} ] "), "[ {} ]");
}

// =========================================================================
// parse_response
// =========================================================================

#[test]
fn parse_plain_array() {
    let notes = parse_response(&make_response(&[NOTE_ARRAY])).unwrap();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].text, "Red Note");
    assert_eq!(notes[0].color, "#FF0000");
    assert_eq!(notes[0].location, PixelPoint { x: 100, y: 30 });
    assert_eq!(notes[0].size, PixelSize { width: 60, height: 40 });
    assert_eq!(notes[1].text, "Green Note");
}

#[test]
fn parse_fenced_array_after_prose_part() {
    let fenced = format!("```json\n{NOTE_ARRAY}\n```");
    let notes = parse_response(&make_response(&["Here are the notes:", &fenced])).unwrap();
    assert_eq!(notes.len(), 2);
}

#[test]
fn parse_skips_empty_array_for_later_non_empty_one() {
    let notes = parse_response(&make_response(&["[]", NOTE_ARRAY])).unwrap();
    assert_eq!(notes.len(), 2);
}

#[test]
fn parse_only_empty_array_is_no_notes() {
    let notes = parse_response(&make_response(&["[]"])).unwrap();
    assert!(notes.is_empty());
}

#[test]
fn parse_without_array_fails() {
    let err = parse_response(&make_response(&["I could not find any notes."])).unwrap_err();
    assert!(matches!(err, VisionError::NoNoteArray));
    assert_eq!(err.error_code(), "E_VISION_NO_NOTES");
}

#[test]
fn parse_without_candidates_fails() {
    let err = parse_response(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap_err();
    assert!(matches!(err, VisionError::NoNoteArray));
}

#[test]
fn parse_invalid_json() {
    let err = parse_response("not json").unwrap_err();
    assert!(matches!(err, VisionError::ApiParse(_)));
}

// =========================================================================
// build_request
// =========================================================================

#[test]
fn request_inlines_base64_image_and_schema() {
    let body = build_request(b"\x89PNG", "image/png");
    let parts = &body["contents"][0]["parts"];
    assert!(parts[0]["text"].as_str().unwrap().contains("post-it"));
    assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
    assert_eq!(parts[1]["inlineData"]["data"], "iVBORw==");

    let config = &body["generationConfig"];
    assert_eq!(config["responseMimeType"], "application/json");
    assert_eq!(config["responseSchema"]["type"], "ARRAY");
    let required = config["responseSchema"]["items"]["required"].as_array().unwrap();
    assert_eq!(required.len(), 6);
}

// =========================================================================
// GeminiExtractor (against a local mock)
// =========================================================================

#[test]
fn endpoint_joins_base_and_model() {
    let extractor = GeminiExtractor::new(config("http://vision.test/v1beta/")).unwrap();
    assert_eq!(extractor.endpoint(), "http://vision.test/v1beta/models/gemini-test:generateContent");
}

#[tokio::test]
async fn extract_posts_to_generate_content() {
    let mock = MockCanvas::default();
    let reply: Value = serde_json::from_str(&make_response(&[NOTE_ARRAY])).unwrap();
    mock.push(MockReply::ok(reply));
    let base = mock.serve().await;

    let extractor = GeminiExtractor::new(config(&base)).unwrap();
    let notes = extractor.extract(b"jpeg-bytes", "image/jpeg").await.unwrap();
    assert_eq!(notes.len(), 2);

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::POST);
    assert_eq!(requests[0].path, "/models/gemini-test:generateContent");
    assert_eq!(requests[0].json()["contents"][0]["parts"][1]["inlineData"]["mimeType"], "image/jpeg");
}

#[tokio::test]
async fn extract_surfaces_provider_status() {
    let mock = MockCanvas::default();
    mock.push(MockReply::status(StatusCode::SERVICE_UNAVAILABLE, "overloaded"));
    let base = mock.serve().await;

    let extractor = GeminiExtractor::new(config(&base)).unwrap();
    let err = extractor.extract(b"x", "image/png").await.unwrap_err();
    assert!(matches!(err, VisionError::ApiResponse { status: 503, ref body } if body == "overloaded"));
    assert!(err.retryable());
}
