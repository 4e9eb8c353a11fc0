#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::{Json, Router};
use hosted_checkout::domain::checkout::{CheckoutRequest, PreferenceResponse};
use hosted_checkout::domain::ports::CheckoutGateway;
use hosted_checkout::error::{CheckoutError, Result};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

type Script = Box<dyn Fn() -> Result<PreferenceResponse> + Send + Sync>;

/// Gateway double that counts calls and answers from a script.
pub struct StubGateway {
    calls: AtomicUsize,
    requests: Mutex<Vec<CheckoutRequest>>,
    script: Script,
    gate: Option<Arc<Notify>>,
}

impl StubGateway {
    pub fn new(script: impl Fn() -> Result<PreferenceResponse> + Send + Sync + 'static) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            script: Box::new(script),
            gate: None,
        }
    }

    pub fn redirecting(init_point: Option<&str>, sandbox_init_point: Option<&str>) -> Self {
        let response = PreferenceResponse {
            id: Some("pref-123".to_string()),
            init_point: init_point.map(str::to_string),
            sandbox_init_point: sandbox_init_point.map(str::to_string),
        };
        Self::new(move || Ok(response.clone()))
    }

    pub fn failing(status: u16, message: &str) -> Self {
        let message = message.to_string();
        Self::new(move || {
            Err(CheckoutError::Provider {
                status,
                message: message.clone(),
            })
        })
    }

    /// Holds every call until `gate` is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<CheckoutRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CheckoutGateway for StubGateway {
    async fn create_preference(&self, request: &CheckoutRequest) -> Result<PreferenceResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        (self.script)()
    }
}

/// A request as seen by the stub provider.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct ProviderState {
    status: StatusCode,
    body: Value,
    recorded: Arc<Mutex<Vec<Recorded>>>,
}

/// Stub provider HTTP server answering every request with `status` and `body`.
pub struct StubProvider {
    pub url: String,
    recorded: Arc<Mutex<Vec<Recorded>>>,
}

impl StubProvider {
    pub async fn start(status: StatusCode, body: Value) -> Self {
        let recorded = Arc::new(Mutex::new(Vec::new()));
        let state = ProviderState {
            status,
            body,
            recorded: recorded.clone(),
        };
        let app = Router::new().fallback(respond).with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self { url, recorded }
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.recorded.lock().unwrap().clone()
    }
}

async fn respond(
    State(state): State<ProviderState>,
    headers: HeaderMap,
    uri: Uri,
    body: String,
) -> (StatusCode, Json<Value>) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    state.recorded.lock().unwrap().push(Recorded {
        path: uri.path().to_string(),
        authorization: header("authorization"),
        content_type: header("content-type"),
        body: serde_json::from_str(&body).unwrap_or(Value::Null),
    });
    (state.status, Json(state.body.clone()))
}

/// An address nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
