//! Integration tests for availability probing and listing
//!
//! Unlike a fallback pass, a probe hits every configured entry even after one
//! succeeds, and skips unconfigured entries without a request.

use garagebill::fallback::{FallbackClient, PROBE_MAX_TOKENS, PROBE_PROMPT};
use garagebill::providers::{ModelConfig, Provider};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_check_availability_probes_every_configured_entry() {
    let gemini = MockServer::start().await;
    let openai = MockServer::start().await;
    let grok = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .and(body_partial_json(json!({
            "contents": [{"parts": [{"text": PROBE_PROMPT}]}],
            "generationConfig": {"maxOutputTokens": PROBE_MAX_TOKENS}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "pong"}]}}]
        })))
        .expect(1)
        .mount(&gemini)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"max_tokens": PROBE_MAX_TOKENS})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "pong"}}]
        })))
        .expect(1)
        .mount(&openai)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&grok)
        .await;

    let client = FallbackClient::new(vec![
        ModelConfig::new(Provider::Gemini, "gemini-2.0-flash", "g").with_base_url(gemini.uri()),
        ModelConfig::new(Provider::OpenAi, "gpt-4o-mini", "sk").with_base_url(openai.uri()),
        ModelConfig::new(Provider::OpenRouter, "x/y", ""),
        ModelConfig::new(Provider::Grok, "grok-2", "xai").with_base_url(grok.uri()),
    ])
    .unwrap();

    let report = client.check_availability().await;

    let summary: Vec<(Provider, bool)> = report
        .iter()
        .map(|a| (a.config.provider(), a.available))
        .collect();
    assert_eq!(
        summary,
        vec![
            (Provider::Gemini, true),
            (Provider::OpenAi, true),
            (Provider::OpenRouter, false),
            (Provider::Grok, false),
        ]
    );

    assert!(report[0].error.is_none());
    assert_eq!(report[2].error.as_deref(), Some("credential not configured"));
    assert_eq!(report[3].error.as_deref(), Some("Grok API error: 403 Forbidden"));
}

#[tokio::test]
async fn test_check_availability_does_not_change_fallback_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "pong"}}]
        })))
        .mount(&server)
        .await;

    let client = FallbackClient::new(vec![
        ModelConfig::new(Provider::OpenAi, "first", "k").with_base_url(server.uri()),
        ModelConfig::new(Provider::OpenAi, "second", "k").with_base_url(server.uri()),
    ])
    .unwrap();

    let before: Vec<String> = client.chain().iter().map(|c| c.to_string()).collect();
    let _ = client.check_availability().await;
    let after: Vec<String> = client.chain().iter().map(|c| c.to_string()).collect();

    assert_eq!(before, after);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[test]
fn test_list_available_is_pure_filter() {
    let client = FallbackClient::new(vec![
        ModelConfig::new(Provider::Gemini, "g1", ""),
        ModelConfig::new(Provider::OpenRouter, "or1", "k"),
        ModelConfig::new(Provider::Grok, "x1", "k"),
        ModelConfig::new(Provider::OpenAi, "o1", ""),
    ])
    .unwrap();

    let available: Vec<String> = client
        .list_available()
        .iter()
        .map(|c| c.to_string())
        .collect();
    assert_eq!(available, vec!["openrouter/or1", "grok/x1"]);
}
