use serde_json::json;
use trellis_core::{OracleError, PlanOracle, UpstreamKind};
use trellis_server::GeminiOracle;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

async fn oracle(server: &MockServer) -> GeminiOracle {
    GeminiOracle::new("test-key", "gemini-2.5-flash", server.uri()).unwrap()
}

#[tokio::test]
async fn test_propose_sends_instructions_and_context() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({
            "system_instruction": { "parts": [{ "text": "be a planner" }] },
            "contents": [{ "role": "user", "parts": [{ "text": "USER'S UI REQUEST: a form" }] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "{\"layout\": \"hello\"}" }] },
                "finishReason": "STOP"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let text = oracle(&server)
        .await
        .propose("be a planner", "USER'S UI REQUEST: a form")
        .await
        .unwrap();
    assert_eq!(text, "{\"layout\": \"hello\"}");
}

#[tokio::test]
async fn test_error_status_is_classifiable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_string("Resource has been exhausted"))
        .mount(&server)
        .await;

    let err = oracle(&server).await.propose("sys", "ctx").await.unwrap_err();
    match &err {
        OracleError::Transport(text) => {
            assert!(text.starts_with("HTTP 429 Too Many Requests"));
            assert!(!text.contains("test-key"));
        }
        other => panic!("expected transport error, got {:?}", other),
    }
    assert_eq!(UpstreamKind::classify(&err), UpstreamKind::RateLimited);
}

#[tokio::test]
async fn test_overloaded_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = oracle(&server).await.propose("sys", "ctx").await.unwrap_err();
    assert_eq!(UpstreamKind::classify(&err), UpstreamKind::Overloaded);
}

#[tokio::test]
async fn test_malformed_success_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy page</html>"))
        .mount(&server)
        .await;

    let err = oracle(&server).await.propose("sys", "ctx").await.unwrap_err();
    assert!(matches!(err, OracleError::Transport(_)));
    assert_eq!(UpstreamKind::classify(&err), UpstreamKind::Unavailable);
}

#[tokio::test]
async fn test_unreachable_service() {
    let oracle = GeminiOracle::new("test-key", "gemini-2.5-flash", "http://127.0.0.1:1").unwrap();

    let err = oracle.propose("sys", "ctx").await.unwrap_err();
    assert!(matches!(err, OracleError::Transport(_)));
}
