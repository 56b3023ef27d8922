//! API endpoint integration tests

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use speakgenie::api::{self, ApiServerBuilder, ApiState};
use speakgenie::responder::{ChatRequest, RoleplayRequest, TranslateRequest};
use speakgenie::session::Utterance;
use speakgenie::{CannedResponder, ConversationGateway, Error, HttpResponder, Responder};
use tokio::net::TcpListener;
use tower::ServiceExt;

mod common;
use common::EchoResponder;

/// Responder whose backend is down
struct Broken;

#[async_trait]
impl Responder for Broken {
    async fn chat(&self, _request: &ChatRequest) -> speakgenie::Result<String> {
        Err(Error::Responder("backend down".to_string()))
    }

    async fn roleplay(&self, _request: &RoleplayRequest) -> speakgenie::Result<String> {
        Err(Error::Responder("backend down".to_string()))
    }

    async fn translate(&self, _request: &TranslateRequest) -> speakgenie::Result<String> {
        Err(Error::Responder("backend down".to_string()))
    }
}

/// Responder that panics inside the handler
struct Exploding;

#[async_trait]
impl Responder for Exploding {
    async fn chat(&self, _request: &ChatRequest) -> speakgenie::Result<String> {
        panic!("table corrupted")
    }

    async fn roleplay(&self, _request: &RoleplayRequest) -> speakgenie::Result<String> {
        panic!("table corrupted")
    }

    async fn translate(&self, _request: &TranslateRequest) -> speakgenie::Result<String> {
        panic!("table corrupted")
    }
}

/// Build a test API router
fn build_test_router(responder: Arc<dyn Responder>) -> axum::Router {
    api::router(Arc::new(ApiState { responder }))
}

fn canned_router() -> axum::Router {
    build_test_router(Arc::new(CannedResponder::seeded(7)))
}

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap();

    (status, json)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();

    let (status, json) = send(canned_router(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "OK");
    assert_eq!(json["message"], "SpeakGenie API is running!");
}

#[tokio::test]
async fn test_chat_noun_question() {
    let (status, json) = send(
        canned_router(),
        post_json("/api/chat", &json!({"message": "What is a noun?", "history": []})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(
        json["response"]
            .as_str()
            .unwrap()
            .starts_with("A noun is a word that names a person, place, or thing!")
    );
}

#[tokio::test]
async fn test_chat_forwards_history() {
    let responder = Arc::new(EchoResponder::default());
    let body = json!({
        "message": "and you?",
        "history": [
            {"text": "hello", "isUser": true},
            {"text": "hi!", "isUser": false}
        ]
    });

    let (status, json) = send(build_test_router(responder.clone()), post_json("/api/chat", &body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["response"], "echo: and you?");
    assert_eq!(*responder.histories.lock().unwrap(), [2]);
}

#[tokio::test]
async fn test_chat_requires_message() {
    for body in [json!({}), json!({"message": ""}), json!({"history": []})] {
        let (status, json) = send(canned_router(), post_json("/api/chat", &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Message is required");
    }
}

#[tokio::test]
async fn test_roleplay_reply_comes_from_scenario_table() {
    let body = json!({"scenario": {"id": "restaurant"}, "message": "Pizza please"});
    let (status, json) = send(canned_router(), post_json("/api/roleplay", &body)).await;

    assert_eq!(status, StatusCode::OK);
    let reply = json["response"].as_str().unwrap();
    assert!(!reply.is_empty());
}

#[tokio::test]
async fn test_roleplay_requires_scenario_and_message() {
    for body in [
        json!({"message": "hello"}),
        json!({"scenario": {"id": "school"}}),
        json!({"scenario": {"id": "school"}, "message": ""}),
    ] {
        let (status, json) = send(canned_router(), post_json("/api/roleplay", &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Scenario and message are required");
    }
}

#[tokio::test]
async fn test_translate_known_and_unknown_phrases() {
    let body = json!({"text": "Thank you", "targetLanguage": "hi-IN"});
    let (status, json) = send(canned_router(), post_json("/api/translate", &body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["translation"], "धन्यवाद");

    let body = json!({"text": "Where is the library?", "targetLanguage": "mr-IN"});
    let (_, json) = send(canned_router(), post_json("/api/translate", &body)).await;
    assert_eq!(json["translation"], "Where is the library?");
}

#[tokio::test]
async fn test_translate_requires_text_and_language() {
    for body in [
        json!({"text": "Hello"}),
        json!({"targetLanguage": "hi-IN"}),
        json!({"text": "", "targetLanguage": "hi-IN"}),
    ] {
        let (status, json) = send(canned_router(), post_json("/api/translate", &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Text and target language are required");
    }
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"message\": "))
        .unwrap();

    let (status, json) = send(canned_router(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid JSON body");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    for uri in ["/api/unknown", "/nowhere"] {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, json) = send(canned_router(), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Route not found");
    }
}

#[tokio::test]
async fn test_responder_failure_is_internal_error() {
    let (status, json) = send(
        build_test_router(Arc::new(Broken)),
        post_json("/api/chat", &json!({"message": "hello"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Internal server error");
}

#[tokio::test]
async fn test_handler_panic_is_caught() {
    let (status, json) = send(
        build_test_router(Arc::new(Exploding)),
        post_json("/api/chat", &json!({"message": "hello"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Something went wrong!");
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let request = Request::builder()
        .uri("/api/health")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap();

    let response = canned_router().oneshot(request).await.unwrap();

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn test_http_responder_against_running_server() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let server = ApiServerBuilder::new(Arc::new(CannedResponder::seeded(1)), port).build();
    let handle = tokio::spawn(server.serve(listener));

    let responder = HttpResponder::new(
        format!("http://127.0.0.1:{port}/api"),
        Duration::from_secs(5),
    )
    .unwrap();
    let gateway = ConversationGateway::new(Arc::new(responder));

    let history = vec![Utterance::user("hello"), Utterance::agent("Hi!")];
    let reply = gateway.respond("Can you explain a verb?", &history).await;
    assert!(reply.starts_with("A verb is an action word!"));

    let translated = gateway.translate("Good morning", "mr-IN").await;
    assert_eq!(translated, "सुप्रभात");

    handle.abort();
}

#[tokio::test]
async fn test_http_responder_unreachable_falls_back() {
    // Bind then drop to get a port with nothing listening
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };

    let responder = HttpResponder::new(
        format!("http://127.0.0.1:{port}/api"),
        Duration::from_secs(2),
    )
    .unwrap();
    let gateway = ConversationGateway::new(Arc::new(responder));

    assert_eq!(
        gateway.respond("hello", &[]).await,
        speakgenie::gateway::CHAT_FALLBACK
    );
    assert_eq!(gateway.translate("Hello", "hi-IN").await, "Hello");
}
