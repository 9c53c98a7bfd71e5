use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_ok_for_health_check(ctx: &TestContext) {
    let response = ctx.client.get("/health").await.unwrap();

    response.assert_status(StatusCode::OK);

    // Health endpoint returns plain text
    let body = String::from_utf8(response.body_bytes.clone()).unwrap();
    assert_eq!(body, "OK");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_include_request_id_in_responses(ctx: &TestContext) {
    let response = ctx.client.get("/health").await.unwrap();
    response.assert_header_exists("x-request-id");

    let request_id = response.header("x-request-id").unwrap();
    assert_eq!(request_id.len(), 36, "Expected a UUID request id");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_echo_caller_request_id(ctx: &TestContext) {
    let response = ctx
        .client
        .post_with_headers(
            "/api/tts/synthesize",
            &serde_json::json!({ "text": "Hello." }),
            &[("x-request-id", "trace-1234")],
        )
        .await
        .unwrap();

    response.assert_header("x-request-id", "trace-1234");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_json_404_for_unknown_routes(ctx: &TestContext) {
    let response = ctx.client.get("/api/does-not-exist").await.unwrap();

    response
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error_message("No such route");
}
