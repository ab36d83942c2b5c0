// runs the sopbot binary against the mock model service

mod common;

use common::{MockGemini, TEST_KEY, text_reply};
use serde_json::Value;
use std::process::Output;
use tokio::process::Command;

async fn sopbot(mock: &MockGemini, env: &[(&str, &str)], args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sopbot"))
        .env_clear()
        .env("SOPBOT_BASE_URL", &mock.base_url)
        .env("NO_COLOR", "1")
        .envs(env.iter().copied())
        .args(args)
        .output()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_missing_key_fails_before_any_call() {
    let mock = MockGemini::start(vec![text_reply("unused")]).await;

    let out = sopbot(&mock, &[], &["ask", "What is PPE?"]).await;

    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("missing api key"), "stderr: {stderr}");
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_blank_keys_count_as_missing() {
    let mock = MockGemini::start(vec![text_reply("unused")]).await;

    let out = sopbot(
        &mock,
        &[("GEMINI_API_KEY", "  "), ("GOOGLE_API_KEY", "")],
        &["ask", "What is PPE?"],
    )
    .await;

    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("missing api key"));
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_google_key_fallback_with_json_output() {
    let mock = MockGemini::start(vec![text_reply("Yes, you can once it is locked out.")]).await;

    let out = sopbot(
        &mock,
        &[("GEMINI_API_KEY", "   "), ("GOOGLE_API_KEY", TEST_KEY)],
        &["ask", "--json", "Can", "I", "start", "the", "lathe?"],
    )
    .await;

    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    assert_eq!(mock.api_keys(), vec![Some(TEST_KEY.to_string())]);

    let json: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["prompt"], "Can I start the lathe?");
    assert_eq!(json["flagged"], true);
    assert_eq!(json["trigger"], "you can");
    assert!(
        json["reply"]
            .as_str()
            .unwrap()
            .ends_with("Consult your supervisor for approval.")
    );
    assert!(json["latency_ms"].is_u64());
}

#[tokio::test]
async fn test_explicit_key_with_plain_output() {
    let mock = MockGemini::start(vec![text_reply("Lockout-tagout isolates energy sources.")]).await;

    let out = sopbot(
        &mock,
        &[],
        &["--api-key", TEST_KEY, "ask", "Explain lockout-tagout"],
    )
    .await;

    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("you: Explain lockout-tagout"));
    assert!(stdout.contains("Lockout-tagout isolates energy sources."));
    assert!(!stdout.contains("REMINDER"));
    assert_eq!(mock.request_count(), 1);
}

#[tokio::test]
async fn test_help_shows_shared_defaults() {
    let mock = MockGemini::start(vec![text_reply("unused")]).await;

    let out = sopbot(&mock, &[], &["--help"]).await;

    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    let timeout = format!("[default: {}]", sopbot::core::DEFAULT_TIMEOUT.as_secs());
    let interval = format!(
        "[default: {}]",
        sopbot::core::DEFAULT_MIN_INTERVAL.as_millis()
    );
    assert!(stdout.contains(&timeout), "{stdout}");
    assert!(stdout.contains(&interval), "{stdout}");
    assert_eq!(mock.request_count(), 0);
}
