use super::*;

/// # Safety
/// All vision env assertions live in one test so parallel tests never race
/// on these variables.
unsafe fn clear_vision_env() {
    unsafe {
        std::env::remove_var(API_KEY_VAR);
        std::env::remove_var("VISION_MODEL");
        std::env::remove_var("VISION_BASE_URL");
        std::env::remove_var("VISION_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("VISION_CONNECT_TIMEOUT_SECS");
    }
}

#[test]
fn from_env_requires_key_then_applies_defaults_and_overrides() {
    unsafe { clear_vision_env() };
    let err = VisionConfig::from_env().unwrap_err();
    assert!(matches!(err, VisionError::MissingApiKey { ref var } if var == API_KEY_VAR));

    unsafe { std::env::set_var(API_KEY_VAR, "   ") };
    assert!(VisionConfig::from_env().is_err());

    unsafe { std::env::set_var(API_KEY_VAR, "g-key") };
    let cfg = VisionConfig::from_env().unwrap();
    assert_eq!(cfg.api_key, "g-key");
    assert_eq!(cfg.model, DEFAULT_VISION_MODEL);
    assert_eq!(cfg.base_url, DEFAULT_VISION_BASE_URL);
    assert_eq!(cfg.timeouts, VisionTimeouts::default());

    unsafe {
        std::env::set_var("VISION_MODEL", "gemini-2.5-pro");
        std::env::set_var("VISION_BASE_URL", "http://localhost:9000/v1/");
        std::env::set_var("VISION_REQUEST_TIMEOUT_SECS", "45");
        std::env::set_var("VISION_CONNECT_TIMEOUT_SECS", "nope");
    }
    let cfg = VisionConfig::from_env().unwrap();
    assert_eq!(cfg.model, "gemini-2.5-pro");
    assert_eq!(cfg.base_url, "http://localhost:9000/v1");
    assert_eq!(
        cfg.timeouts,
        VisionTimeouts { request_secs: 45, connect_secs: DEFAULT_VISION_CONNECT_TIMEOUT_SECS }
    );

    unsafe { clear_vision_env() };
}

#[test]
fn timeouts_convert_to_durations() {
    let t = VisionTimeouts { request_secs: 3, connect_secs: 1 };
    assert_eq!(t.request(), Duration::from_secs(3));
    assert_eq!(t.connect(), Duration::from_secs(1));
}
