use crate::e2e::helpers;

use helpers::speech_mocks::ScriptedSpeechEndpoint;
use helpers::TestContext;
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use test_context::test_context;
use tts_studio_backend::controllers::tts::VoicesResponse;
use tts_studio_backend::domain::tts::{TransportError, VoiceName};

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_list_voices(ctx: &TestContext) {
    let response = ctx.client.get("/api/tts/voices").await.unwrap();
    response.assert_status(StatusCode::OK);

    let voices: VoicesResponse = response.json().unwrap();
    assert_eq!(voices.voices.len(), 5);
    assert!(voices.voices.contains(&VoiceName::Zephyr));
    assert_eq!(voices.default, VoiceName::Fenrir);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_synthesize_short_text_as_wav(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/tts/synthesize",
            &json!({ "text": "Greetings! I am ready to convert your text.", "voice": "kore" }),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::OK)
        .assert_header("content-type", "audio/wav")
        .assert_header("x-chunk-count", "1")
        .assert_header("x-skipped-chunks", "0")
        .assert_header("x-character-count", "43");

    assert_eq!(response.wav_samples(), vec![0, 0]);

    let calls = ctx.endpoint.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].voices, vec![VoiceName::Kore]);
    assert!(ctx.sleeper.slept().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_split_long_text_and_keep_order(ctx: &TestContext) {
    let sentence = format!("{}. ", "a".repeat(48));
    let text = sentence.repeat(6);

    let response = ctx
        .client
        .post("/api/tts/synthesize", &json!({ "text": text, "format": "pcm" }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::OK)
        .assert_header("content-type", "audio/L16;rate=24000;channels=1")
        .assert_header("x-chunk-count", "3");

    assert_eq!(response.body_bytes, vec![0, 0, 0, 0, 1, 0, 1, 0, 2, 0, 2, 0]);

    let calls = ctx.endpoint.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|c| c.prompt.chars().count() <= 120));
    assert!(calls.iter().all(|c| c.voices == vec![VoiceName::Fenrir]));
    assert_eq!(
        calls.iter().map(|c| c.prompt.as_str()).collect::<String>(),
        text
    );

    // Throttle before every chunk after the first
    assert_eq!(ctx.sleeper.slept(), vec![Duration::from_millis(2000); 2]);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_empty_text(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/tts/synthesize", &json!({ "text": "   " }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("Text cannot be empty");
    assert!(ctx.endpoint.calls().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_text_over_limit(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/tts/synthesize", &json!({ "text": "a".repeat(10_001) }))
        .await
        .unwrap();

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert!(ctx.endpoint.calls().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_unknown_voice(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/tts/synthesize", &json!({ "text": "Hello.", "voice": "Joanna" }))
        .await
        .unwrap();

    assert!(response.status.is_client_error());
    assert!(ctx.endpoint.calls().is_empty());
}

#[tokio::test]
async fn it_should_recover_from_rate_limiting() {
    let endpoint = ScriptedSpeechEndpoint::new(|index, _| {
        if index < 2 {
            Err(TransportError::new(
                Some(429),
                Some("RESOURCE_EXHAUSTED".to_string()),
                "Resource has been exhausted (e.g. check quota).",
            ))
        } else {
            Ok(vec![5, 0])
        }
    });
    let ctx = TestContext::with_endpoint(endpoint).await;

    let response = ctx
        .client
        .post("/api/tts/synthesize", &json!({ "text": "Hello.", "format": "pcm" }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.body_bytes, vec![5, 0]);
    assert_eq!(ctx.endpoint.calls().len(), 3);

    let slept = ctx.sleeper.slept();
    assert_eq!(slept, vec![Duration::from_millis(5000); 2]);
    assert!(slept.iter().sum::<Duration>() >= Duration::from_millis(7500));
}

#[tokio::test]
async fn it_should_skip_a_failing_chunk() {
    let endpoint = ScriptedSpeechEndpoint::new(|index, _| {
        if index == 1 {
            Err(TransportError::status(400, "Request contains an invalid argument."))
        } else {
            Ok(vec![index as u8, 0])
        }
    });
    let ctx = TestContext::with_endpoint(endpoint).await;
    let text = format!("{}. ", "b".repeat(70)).repeat(3);

    let response = ctx
        .client
        .post("/api/tts/synthesize", &json!({ "text": text, "format": "pcm" }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::OK)
        .assert_header("x-chunk-count", "3")
        .assert_header("x-skipped-chunks", "1");
    assert_eq!(response.body_bytes, vec![0, 0, 2, 0]);
}

#[tokio::test]
async fn it_should_fail_when_no_chunk_produces_audio() {
    let endpoint =
        ScriptedSpeechEndpoint::new(|_, _| Err(TransportError::status(403, "API key not valid")));
    let ctx = TestContext::with_endpoint(endpoint).await;

    let response = ctx
        .client
        .post("/api/tts/synthesize", &json!({ "text": "Hello." }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_GATEWAY)
        .assert_error_message("No audio generated");
    assert_eq!(ctx.endpoint.calls().len(), 1);
}
