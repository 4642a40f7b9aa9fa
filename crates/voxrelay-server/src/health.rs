use axum::{Json, response::IntoResponse};
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
struct Health {
    status: &'static str,
    timestamp: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Echo {
    message: &'static str,
    received_data: Value,
    timestamp: String,
}

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    Json(Health {
        status: "OK",
        timestamp: now(),
    })
}

/// Echo handler for checking connectivity from a client
pub async fn echo_handler(body: Bytes) -> impl IntoResponse {
    Json(Echo {
        message: "Backend is working!",
        received_data: received_data(&body),
        timestamp: now(),
    })
}

/// JSON bodies are echoed as-is, anything else as a string; an empty body is `{}`
fn received_data(body: &[u8]) -> Value {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Value::Object(serde_json::Map::new());
    }

    serde_json::from_slice(body).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

fn now() -> String {
    jiff::Timestamp::now().to_string()
}
