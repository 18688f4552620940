//! Hand-written test doubles shared by the application tests.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use corpo_core::navigation::{Navigator, Route};
use corpo_core::transport::{ApiRequest, ApiResponse, HttpTransport, Method, TransportError};
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

fn route_key(method: Method, path: &str) -> String {
    format!("{} {}", method, path)
}

/// Transport answering from per-route queues of scripted results and
/// recording every request it sees.
#[derive(Default)]
pub struct MockTransport {
    scripted: Mutex<HashMap<String, VecDeque<Result<ApiResponse, TransportError>>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: Method, path: &str, result: Result<ApiResponse, TransportError>) {
        self.scripted
            .lock()
            .unwrap()
            .entry(route_key(method, path))
            .or_default()
            .push_back(result);
    }

    pub fn ok(&self, method: Method, path: &str, body: Value) {
        self.respond(method, path, Ok(ApiResponse::ok(body)));
    }

    pub fn fail(&self, method: Method, path: &str, status: u16, body: Value) {
        self.respond(method, path, Err(TransportError::status(status, body)));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.path == path)
            .collect()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let key = route_key(request.method, &request.path);
        self.requests.lock().unwrap().push(request);
        self.scripted
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(TransportError::Network(format!("unscripted request {}", key))))
    }
}

/// Holds every request to one route until released, then answers from the
/// wrapped `MockTransport`.
pub struct GatedTransport {
    inner: Arc<MockTransport>,
    gated: String,
    arrived: Notify,
    release: Notify,
}

impl GatedTransport {
    pub fn new(inner: Arc<MockTransport>, method: Method, path: &str) -> Self {
        Self {
            inner,
            gated: route_key(method, path),
            arrived: Notify::new(),
            release: Notify::new(),
        }
    }

    /// Resolves once a request to the gated route is waiting.
    pub async fn arrived(&self) {
        self.arrived.notified().await;
    }

    /// Lets one waiting request through.
    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl HttpTransport for GatedTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        if route_key(request.method, &request.path) == self.gated {
            self.arrived.notify_one();
            self.release.notified().await;
        }
        self.inner.execute(request).await
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }
}

/// A JWT-shaped token whose payload carries `exp`.
pub fn token_with_exp(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(json!({"sub": "u1", "exp": exp}).to_string());
    format!("{}.{}.sig", header, payload)
}

/// A token valid for the next hour.
pub fn fresh_token() -> String {
    token_with_exp(corpo_core::auth::token::now_seconds() as i64 + 3600)
}

pub fn expired_token() -> String {
    token_with_exp(1_000)
}
