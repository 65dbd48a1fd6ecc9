//! Scriptable stand-in for an OpenAI-compatible chat completions API

#![allow(dead_code)]

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// What the mock does with the next chat completion request
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// 200 with the given assistant content
    Reply(String),
    /// 200 with `content: null`
    NullContent,
    /// 200 with an empty `choices` array
    NoChoices,
    /// Non-2xx status with a body
    Status(u16, String),
    /// 200 with a body that is not a chat completion
    Garbage(String),
    /// Reply after sleeping
    Delayed(Duration, String),
}

struct MockState {
    behavior: Mutex<MockBehavior>,
    requests: Mutex<Vec<Value>>,
    auth_headers: Mutex<Vec<Option<String>>>,
}

pub struct MockOpenAIServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    _handle: tokio::task::JoinHandle<()>,
}

impl MockOpenAIServer {
    pub async fn start(behavior: MockBehavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let state = Arc::new(MockState {
            behavior: Mutex::new(behavior),
            requests: Mutex::new(Vec::new()),
            auth_headers: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/chat/completions", post(mock_chat_completions))
            .with_state(state.clone());

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        tokio::time::sleep(Duration::from_millis(10)).await;

        Self {
            addr,
            state,
            _handle: handle,
        }
    }

    pub async fn replying(content: &str) -> Self {
        Self::start(MockBehavior::Reply(content.to_string())).await
    }

    /// Base URL including the `/v1` prefix, as configured for the provider
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    pub fn set_behavior(&self, behavior: MockBehavior) {
        *self.state.behavior.lock().unwrap() = behavior;
    }

    pub fn requests(&self) -> Vec<Value> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<Value> {
        self.state.requests.lock().unwrap().last().cloned()
    }

    /// Content of the single user message of the last request
    pub fn last_prompt(&self) -> Option<String> {
        self.last_request()
            .and_then(|req| req["messages"][0]["content"].as_str().map(str::to_string))
    }

    pub fn last_auth_header(&self) -> Option<String> {
        self.state
            .auth_headers
            .lock()
            .unwrap()
            .last()
            .cloned()
            .flatten()
    }
}

fn completion_body(model: &str, content: Value) -> Value {
    json!({
        "id": "chatcmpl-123456789",
        "object": "chat.completion",
        "created": 1677652288,
        "model": model,
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": content
            },
            "finish_reason": "stop"
        }],
        "usage": {
            "prompt_tokens": 120,
            "completion_tokens": 12,
            "total_tokens": 132
        }
    })
}

async fn mock_chat_completions(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(request): Json<Value>,
) -> Response {
    let model = request
        .get("model")
        .and_then(|v| v.as_str())
        .unwrap_or("gpt-4o-mini")
        .to_string();

    state.requests.lock().unwrap().push(request);
    state.auth_headers.lock().unwrap().push(
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    );

    let behavior = state.behavior.lock().unwrap().clone();

    match behavior {
        MockBehavior::Reply(content) => {
            Json(completion_body(&model, Value::String(content))).into_response()
        }
        MockBehavior::NullContent => Json(completion_body(&model, Value::Null)).into_response(),
        MockBehavior::NoChoices => {
            let mut body = completion_body(&model, Value::Null);
            body["choices"] = json!([]);
            Json(body).into_response()
        }
        MockBehavior::Status(status, body) => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body,
        )
            .into_response(),
        MockBehavior::Garbage(body) => (StatusCode::OK, body).into_response(),
        MockBehavior::Delayed(delay, content) => {
            tokio::time::sleep(delay).await;
            Json(completion_body(&model, Value::String(content))).into_response()
        }
    }
}
