#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use chat_widget::message::{AskRequest, AskResponse, ChatTurn};
use serde_json::json;

/// Requests the stub received, in order.
pub type RequestLog = Arc<Mutex<Vec<AskRequest>>>;

#[derive(Clone, Default)]
struct Upstream {
    log: RequestLog,
    history: Arc<Mutex<Vec<ChatTurn>>>,
}

/// Minimal `/ask` server: issues session "abc", keeps one shared history and
/// answers "hello" with "hi there", anything else with an echo.
/// `/broken` always fails with a 500, `/garbled` returns a non-JSON body and
/// `/no-history` returns a session id without any history.
pub async fn spawn_upstream() -> (String, RequestLog) {
    let upstream = Upstream::default();
    let log = upstream.log.clone();

    let app = Router::new()
        .route("/ask", post(ask))
        .route("/broken", post(broken))
        .route("/garbled", post(|| async { "<html>not json</html>" }))
        .route("/no-history", post(|| async { Json(json!({ "session_id": "x" })) }))
        .with_state(upstream);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), log)
}

async fn ask(State(upstream): State<Upstream>, Json(req): Json<AskRequest>) -> Json<AskResponse> {
    upstream.log.lock().unwrap().push(req.clone());

    let answer = if req.question == "hello" {
        "hi there".to_string()
    } else {
        format!("echo: {}", req.question)
    };

    let mut history = upstream.history.lock().unwrap();
    history.push(ChatTurn::user(req.question));
    history.push(ChatTurn::assistant(answer));

    Json(AskResponse { session_id: "abc".to_string(), history: history.clone() })
}

async fn broken(
    State(upstream): State<Upstream>,
    Json(req): Json<AskRequest>,
) -> (StatusCode, Json<serde_json::Value>) {
    upstream.log.lock().unwrap().push(req);
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "detail": "model unavailable" })))
}
