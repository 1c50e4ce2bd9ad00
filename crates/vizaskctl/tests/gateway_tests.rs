//! HttpBackend against a local axum server

use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use vizask_shared::{build, FilterSnapshot, FilterValue, Mode, RequestPayload};
use vizaskctl::{Backend, GatewayError, HttpBackend};

/// Serve `app` on an ephemeral port and return the endpoint URL.
async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/ask-ai", addr)
}

fn payload() -> RequestPayload {
    let mut filters = FilterSnapshot::new();
    filters.insert("Region", FilterValue::values(["East", "West"]).unwrap());
    filters.insert("Segment", FilterValue::AllSelected);
    build(Mode::AiAssistant, "Which region grew?", filters).unwrap()
}

#[tokio::test]
async fn test_posts_json_body_and_reads_answer() {
    let app = Router::new().route(
        "/ask-ai",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            let content_type = headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            Json(json!({
                "answer": "West grew 12%.",
                "content_type": content_type,
                "echo": body,
            }))
        }),
    );
    let backend = HttpBackend::new(serve(app).await);

    let resp = backend.send(&payload()).await.unwrap();

    assert_eq!(resp.answer(), "West grew 12%.");
    assert_eq!(resp.body()["content_type"], "application/json");
    assert_eq!(
        resp.body()["echo"],
        json!({
            "request_meta": {"mode_type": "AI Assistant", "question": "Which region grew?"},
            "period": {"start_date": null, "end_date": null},
            "filters": {"Region": ["East", "West"], "Segment": ["(All)"]},
            "mode_type": "AI Assistant",
            "user_question": "Which region grew?"
        })
    );
}

#[tokio::test]
async fn test_error_status_uses_error_field() {
    let app = Router::new().route(
        "/ask-ai",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "db down"})),
            )
        }),
    );
    let backend = HttpBackend::new(serve(app).await);

    let err = backend.send(&payload()).await.unwrap_err();

    assert!(matches!(err, GatewayError::Backend(_)));
    assert_eq!(err.to_string(), "db down");
}

#[tokio::test]
async fn test_error_status_without_json_uses_status_line() {
    let app = Router::new().route(
        "/ask-ai",
        post(|| async { (StatusCode::BAD_GATEWAY, "upstream gone") }),
    );
    let backend = HttpBackend::new(serve(app).await);

    let err = backend.send(&payload()).await.unwrap_err();

    assert_eq!(err.to_string(), "HTTP 502: Bad Gateway");
    assert_eq!(err.code(), "backend_error");
}

#[tokio::test]
async fn test_success_with_non_json_body_is_malformed() {
    let app = Router::new().route("/ask-ai", post(|| async { "<html>ok</html>" }));
    let backend = HttpBackend::new(serve(app).await);

    let err = backend.send(&payload()).await.unwrap_err();

    assert!(matches!(err, GatewayError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_success_with_json_array_is_malformed() {
    let app = Router::new().route("/ask-ai", post(|| async { Json(json!(["a", "b"])) }));
    let backend = HttpBackend::new(serve(app).await);

    let err = backend.send(&payload()).await.unwrap_err();

    assert_eq!(err.code(), "malformed_response");
}

#[tokio::test]
async fn test_success_without_answer_reads_empty() {
    let app = Router::new().route("/ask-ai", post(|| async { Json(json!({"status": "ok"})) }));
    let backend = HttpBackend::new(serve(app).await);

    let resp = backend.send(&payload()).await.unwrap();

    assert_eq!(resp.answer(), "");
    assert_eq!(resp.body()["status"], "ok");
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let backend = HttpBackend::new(format!("http://{}/ask-ai", addr));
    let err = backend.send(&payload()).await.unwrap_err();

    assert!(matches!(err, GatewayError::Transport(_)));
    assert!(err.to_string().starts_with("Backend unreachable:"));
}
