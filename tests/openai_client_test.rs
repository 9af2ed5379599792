use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use accounting_agent::application::ports::{LlmClient, LlmClientError};
use accounting_agent::infrastructure::llm::OpenAiClient;
use accounting_agent::presentation::config::LlmSettings;

type Captured = Arc<Mutex<Option<Value>>>;

async fn start_mock_openai_server(
    status: u16,
    response_body: Value,
) -> (String, Captured, oneshot::Sender<()>) {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let captured: Captured = Arc::new(Mutex::new(None));

    let app = Router::new()
        .route(
            "/chat/completions",
            post(
                move |State(captured): State<Captured>, Json(request): Json<Value>| {
                    let body = response_body.clone();
                    async move {
                        *captured.lock().unwrap() = Some(request);
                        let status = StatusCode::from_u16(status).unwrap();
                        (status, Json(body)).into_response()
                    }
                },
            ),
        )
        .with_state(Arc::clone(&captured));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .ok();
    });

    (base_url, captured, shutdown_tx)
}

fn settings(base_url: &str) -> LlmSettings {
    LlmSettings {
        api_key: "test-key".to_string(),
        base_url: base_url.to_string(),
        model: "gpt-4".to_string(),
        temperature: 0.3,
        max_tokens: 500,
        request_timeout_secs: 5,
        max_concurrent_requests: 2,
    }
}

fn completion(contents: &[&str]) -> Value {
    json!({
        "choices": contents
            .iter()
            .map(|c| json!({ "message": { "role": "assistant", "content": c } }))
            .collect::<Vec<_>>()
    })
}

#[tokio::test]
async fn given_json_completion_when_requesting_then_returns_content_and_asks_for_json_mode() {
    let content = r#"{"intent": "get_transactions"}"#;
    let (base_url, captured, shutdown_tx) =
        start_mock_openai_server(200, completion(&[content])).await;
    let client = OpenAiClient::new(&settings(&base_url));

    let result = client
        .complete_json("parse this", "show my transactions")
        .await
        .unwrap();

    assert_eq!(result, content);
    let request = captured.lock().unwrap().clone().unwrap();
    assert_eq!(request["model"], "gpt-4");
    assert_eq!(request["response_format"]["type"], "json_object");
    assert_eq!(request["messages"][0]["role"], "system");
    assert_eq!(request["messages"][1]["content"], "show my transactions");
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_several_choices_when_requesting_suggestions_then_all_returned() {
    let (base_url, captured, shutdown_tx) =
        start_mock_openai_server(200, completion(&["Show my balance", "List expenses"])).await;
    let client = OpenAiClient::new(&settings(&base_url));

    let choices = client.complete_choices("suggest", 2).await.unwrap();

    assert_eq!(choices, vec!["Show my balance", "List expenses"]);
    assert_eq!(captured.lock().unwrap().as_ref().unwrap()["n"], 2);
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_rate_limited_api_when_requesting_then_rate_limited_error() {
    let (base_url, _captured, shutdown_tx) =
        start_mock_openai_server(429, json!({ "error": { "message": "slow down" } })).await;
    let client = OpenAiClient::new(&settings(&base_url));

    let result = client.complete_json("parse", "text").await;

    assert!(matches!(result, Err(LlmClientError::RateLimited)));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_server_error_when_requesting_then_api_request_failed() {
    let (base_url, _captured, shutdown_tx) =
        start_mock_openai_server(500, json!({ "error": "boom" })).await;
    let client = OpenAiClient::new(&settings(&base_url));

    let result = client.complete_json("parse", "text").await;

    assert!(matches!(result, Err(LlmClientError::ApiRequestFailed(_))));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_no_choices_when_requesting_then_invalid_response() {
    let (base_url, _captured, shutdown_tx) =
        start_mock_openai_server(200, json!({ "choices": [] })).await;
    let client = OpenAiClient::new(&settings(&base_url));

    let result = client.complete_json("parse", "text").await;

    assert!(matches!(result, Err(LlmClientError::InvalidResponse(_))));
    shutdown_tx.send(()).ok();
}
