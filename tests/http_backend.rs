//! HttpBackend against a mock chat server.

use photochat::backend::{ChatRequest, PhotoRequest};
use photochat::error::BackendError;
use photochat::{ChatBackend, Config, HttpBackend, Message, Role};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer) -> HttpBackend {
    let config = Config {
        base_url: server.uri(),
        ..Config::default()
    };
    HttpBackend::new(&config).expect("backend should build")
}

fn photo_request(prompt: &str) -> PhotoRequest {
    PhotoRequest {
        girl_id: Some("anastasia".to_string()),
        prompt: prompt.to_string(),
        style: None,
        pose: None,
    }
}

#[tokio::test]
async fn chat_posts_history_and_returns_raw_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(json!({
            "girl_id": "anastasia",
            "messages": [
                { "role": "assistant", "content": "Bonjour." },
                { "role": "user", "content": "Salut" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("Enchantée. [PHOTO: sourire]"))
        .expect(1)
        .mount(&server)
        .await;

    let request = ChatRequest {
        girl_id: Some("anastasia".to_string()),
        messages: vec![
            Message::new(Role::Assistant, "Bonjour."),
            Message::new(Role::User, "Salut"),
        ],
    };
    let reply = backend_for(&server)
        .chat(&request)
        .await
        .expect("chat should succeed");

    assert_eq!(reply, "Enchantée. [PHOTO: sourire]");
}

#[tokio::test]
async fn chat_without_persona_omits_girl_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(json!({
            "messages": [{ "role": "user", "content": "hi" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
        .expect(1)
        .mount(&server)
        .await;

    let request = ChatRequest {
        girl_id: None,
        messages: vec![Message::new(Role::User, "hi")],
    };
    let reply = backend_for(&server).chat(&request).await;
    assert_eq!(reply.expect("chat should succeed"), "hello");
}

#[tokio::test]
async fn chat_non_success_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "upstream down" })))
        .mount(&server)
        .await;

    let request = ChatRequest {
        girl_id: None,
        messages: vec![Message::new(Role::User, "hi")],
    };
    let error = backend_for(&server)
        .chat(&request)
        .await
        .expect_err("500 should fail");

    match error {
        BackendError::Status { status, .. } => assert_eq!(status.as_u16(), 500),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn chat_path_is_configurable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let config = Config {
        base_url: format!("{}/", server.uri()),
        chat_path: "api/chat".to_string(),
        ..Config::default()
    };
    let backend = HttpBackend::new(&config).expect("backend should build");
    assert_eq!(backend.chat_url(), format!("{}/api/chat", server.uri()));

    let request = ChatRequest {
        girl_id: None,
        messages: vec![Message::new(Role::User, "hi")],
    };
    assert_eq!(backend.chat(&request).await.expect("chat should succeed"), "ok");
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let config = Config {
        base_url: "http://127.0.0.1:1".to_string(),
        ..Config::default()
    };
    let backend = HttpBackend::new(&config).expect("backend should build");
    let request = ChatRequest {
        girl_id: None,
        messages: vec![Message::new(Role::User, "hi")],
    };

    let error = backend.chat(&request).await.expect_err("connection should fail");
    assert!(matches!(error, BackendError::Transport { .. }), "got {error}");
}

#[tokio::test]
async fn photo_posts_prompt_and_reads_data_array() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/photo"))
        .and(body_json(json!({ "girl_id": "anastasia", "prompt": " sourire" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [{ "url": "X" }] })))
        .expect(1)
        .mount(&server)
        .await;

    let response = backend_for(&server)
        .photo(&photo_request(" sourire"))
        .await
        .expect("photo should succeed");
    assert_eq!(response.image_url(), Some("X"));
}

#[tokio::test]
async fn photo_sends_style_and_pose_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/photo"))
        .and(body_json(json!({
            "prompt": "plage",
            "style": "cinematic",
            "pose": "standing"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "url": "https://cdn/1.png" })))
        .expect(1)
        .mount(&server)
        .await;

    let request = PhotoRequest {
        girl_id: None,
        prompt: "plage".to_string(),
        style: Some("cinematic".to_string()),
        pose: Some("standing".to_string()),
    };
    let response = backend_for(&server)
        .photo(&request)
        .await
        .expect("photo should succeed");
    assert_eq!(response.image_url(), Some("https://cdn/1.png"));
}

#[tokio::test]
async fn photo_without_url_parses_to_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/photo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let response = backend_for(&server)
        .photo(&photo_request("plage"))
        .await
        .expect("photo should succeed");
    assert_eq!(response.image_url(), None);
}

#[tokio::test]
async fn photo_non_json_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/photo"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let error = backend_for(&server)
        .photo(&photo_request("plage"))
        .await
        .expect_err("html should not decode");
    assert!(matches!(error, BackendError::Decode { .. }), "got {error}");
}
