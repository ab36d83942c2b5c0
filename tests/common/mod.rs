// in-process stand-in for the gemini generateContent endpoint

#![allow(dead_code)]

use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    routing::post,
};
use serde_json::{Value, json};
use sopbot::{Chat, Credential, Gemini, ModelConfig};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TEST_KEY: &str = "test-key";

#[derive(Clone)]
pub struct Canned {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl Canned {
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

pub fn text_reply(text: &str) -> Canned {
    raw_reply(
        200,
        json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": text}]},
                "finishReason": "STOP"
            }]
        }),
    )
}

pub fn error_reply(status: u16, status_text: &str, message: &str) -> Canned {
    raw_reply(
        status,
        json!({"error": {"code": status, "message": message, "status": status_text}}),
    )
}

pub fn raw_reply(status: u16, body: Value) -> Canned {
    Canned {
        status,
        body: body.to_string(),
        delay: Duration::ZERO,
    }
}

#[derive(Default)]
struct Recorded {
    bodies: Vec<Value>,
    api_keys: Vec<Option<String>>,
    calls: Vec<String>,
}

struct MockState {
    // the last reply sticks once the queue is down to one
    replies: Mutex<VecDeque<Canned>>,
    recorded: Mutex<Recorded>,
}

pub struct MockGemini {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockGemini {
    pub async fn start(replies: Vec<Canned>) -> Self {
        let state = Arc::new(MockState {
            replies: Mutex::new(replies.into()),
            recorded: Mutex::new(Recorded::default()),
        });

        let app = Router::new()
            .route("/v1beta/models/{call}", post(generate))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}/v1beta"),
            state,
        }
    }

    pub fn bodies(&self) -> Vec<Value> {
        self.state.recorded.lock().unwrap().bodies.clone()
    }

    pub fn api_keys(&self) -> Vec<Option<String>> {
        self.state.recorded.lock().unwrap().api_keys.clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.recorded.lock().unwrap().calls.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.recorded.lock().unwrap().bodies.len()
    }

    pub fn config(&self) -> ModelConfig {
        ModelConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(5),
            min_interval: Duration::ZERO,
            ..ModelConfig::default()
        }
    }

    pub fn gemini(&self) -> Gemini {
        Gemini::new(self.config(), Credential::new(TEST_KEY).unwrap()).unwrap()
    }

    pub fn chat(&self) -> Chat {
        Chat::new(self.gemini())
    }
}

async fn generate(
    State(state): State<Arc<MockState>>,
    Path(call): Path<String>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let canned = {
        let mut replies = state.replies.lock().unwrap();
        if replies.len() > 1 {
            replies.pop_front()
        } else {
            replies.front().cloned()
        }
    }
    .unwrap_or_else(|| text_reply("ok"));

    {
        let mut recorded = state.recorded.lock().unwrap();
        recorded
            .bodies
            .push(serde_json::from_str(&body).unwrap_or(Value::Null));
        recorded.api_keys.push(
            headers
                .get("x-goog-api-key")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        );
        recorded.calls.push(call);
    }

    if !canned.delay.is_zero() {
        tokio::time::sleep(canned.delay).await;
    }

    (
        StatusCode::from_u16(canned.status).unwrap(),
        [(header::CONTENT_TYPE, "application/json")],
        canned.body,
    )
}
