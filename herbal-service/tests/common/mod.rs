#![allow(dead_code)]

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use herbal_service::config::{
    CorsConfig, GoogleConfig, HerbalConfig, ModelConfig, RateLimitConfig, TimeoutConfig,
    DEFAULT_GEMINI_API_BASE,
};
use herbal_service::services::providers::mock::{MockReply, MockTextProvider};
use herbal_service::startup::{build_router, AppState};
use http_body_util::BodyExt;
use secrecy::Secret;
use serde_json::{json, Value};
use service_core::config::{Config, Environment};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

pub const REMEDY_MARKDOWN: &str = "## Recommended Herbs\n- Ginger: eases nausea.\n- Peppermint: soothes tension headaches.\n\n## Preparation Methods\nSteep one teaspoon in hot water for ten minutes.\n\n## Dosage & Administration\nOne cup up to three times daily.\n\n## Precautions & Contraindications\nAvoid peppermint with reflux.\n\n## When to See a Doctor\nIf symptoms last more than three days.\n\n## Additional Tips\nStay hydrated and rest.";

/// Configuration that needs no environment variables.
pub fn test_config() -> HerbalConfig {
    HerbalConfig {
        common: Config { port: 0 },
        environment: Environment::Test,
        google: GoogleConfig {
            api_key: Secret::new("test-api-key".to_string()),
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
        },
        models: ModelConfig {
            text_model: "gemini-1.5-flash".to_string(),
        },
        timeouts: TimeoutConfig {
            classify: Duration::from_secs(10),
            generate: Duration::from_secs(30),
        },
        rate_limit: RateLimitConfig {
            max_requests: 100,
            window_seconds: 15 * 60,
        },
        cors: CorsConfig {
            allowed_origins: Vec::new(),
        },
    }
}

pub fn app_with(config: HerbalConfig, script: Vec<MockReply>) -> (Router, Arc<MockTextProvider>) {
    let mock = Arc::new(MockTextProvider::new(script));
    let router = build_router(AppState::new(config, mock.clone()));
    (router, mock)
}

pub fn app(script: Vec<MockReply>) -> (Router, Arc<MockTextProvider>) {
    app_with(test_config(), script)
}

pub fn remedy_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/herbal-remedy")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn read_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ============================================================================
// Stub Gemini server
// ============================================================================

/// A request the stub received.
#[derive(Debug, Clone)]
pub struct StubCall {
    pub path_model: String,
    pub key: Option<String>,
    pub body: Value,
}

#[derive(Clone, Default)]
pub struct StubState {
    replies: Arc<Mutex<VecDeque<(StatusCode, Value)>>>,
    calls: Arc<Mutex<Vec<StubCall>>>,
}

impl StubState {
    pub fn calls(&self) -> Vec<StubCall> {
        self.calls.lock().unwrap().clone()
    }
}

async fn stub_generate(
    State(state): State<StubState>,
    Path(model): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.calls.lock().unwrap().push(StubCall {
        path_model: model,
        key: query.get("key").cloned(),
        body,
    });

    let (status, reply) = state
        .replies
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or((StatusCode::INTERNAL_SERVER_ERROR, json!({"error": {"message": "stub exhausted"}})));

    (status, Json(reply))
}

async fn stub_models(Query(query): Query<HashMap<String, String>>) -> impl IntoResponse {
    if query.get("key").map(String::as_str) == Some("test-api-key") {
        (StatusCode::OK, Json(json!({ "models": [] })))
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": { "code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT" } })),
        )
    }
}

/// Spawn a stub Gemini API replaying `replies` in order. Returns its base URL.
pub async fn spawn_gemini_stub(replies: Vec<(StatusCode, Value)>) -> (String, StubState) {
    let state = StubState {
        replies: Arc::new(Mutex::new(replies.into())),
        calls: Arc::new(Mutex::new(Vec::new())),
    };

    let router = Router::new()
        .route("/v1beta/models", get(stub_models))
        .route("/v1beta/models/:model", post(stub_generate))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub listener");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    (format!("http://127.0.0.1:{}/v1beta", port), state)
}

/// A successful generateContent body with the given text.
pub fn gemini_text(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }],
        "usageMetadata": {
            "promptTokenCount": 12,
            "candidatesTokenCount": 34,
            "totalTokenCount": 46
        }
    })
}
