//! In-memory stand-in for the CreatorOS backend.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use creatoros_core::api::{ApiError, ApiResponse, Gateway, HttpRequest, Transport};
use creatoros_core::auth::{CredentialSource, MemoryTokenStore, StaticCredentials, TokenStore};
use parking_lot::Mutex;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

pub const BASE_URL: &str = "http://backend.test";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

/// Accepts `Bearer <accepted_token>` on every route except `/auth/login`.
pub struct FakeBackend {
    accepted_token: Mutex<Option<String>>,
    /// Token handed out by successful logins
    issued_token: Mutex<String>,
    routes: Mutex<HashMap<(Method, String), Value>>,
    /// Replies for `/auth/login`, consumed before the default success
    login_script: Mutex<VecDeque<ApiResponse>>,
    /// Replies for any other route, consumed before normal routing
    route_script: Mutex<VecDeque<Result<ApiResponse, ApiError>>>,
    login_delay: Mutex<Duration>,
    /// Applied to every route except `/auth/login`
    route_delay: Mutex<Duration>,
    /// Reject every credential, even freshly issued ones
    reject_all: Mutex<bool>,
    requests: Mutex<Vec<Recorded>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            accepted_token: Mutex::new(None),
            issued_token: Mutex::new("tok-123".to_string()),
            routes: Mutex::new(HashMap::new()),
            login_script: Mutex::new(VecDeque::new()),
            route_script: Mutex::new(VecDeque::new()),
            login_delay: Mutex::new(Duration::ZERO),
            route_delay: Mutex::new(Duration::ZERO),
            reject_all: Mutex::new(false),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn route(&self, method: Method, path: &str, body: Value) {
        self.routes.lock().insert((method, path.to_string()), body);
    }

    pub fn accept_token(&self, token: &str) {
        *self.accepted_token.lock() = Some(token.to_string());
    }

    pub fn issue_token(&self, token: &str) {
        *self.issued_token.lock() = token.to_string();
    }

    pub fn script_login(&self, response: ApiResponse) {
        self.login_script.lock().push_back(response);
    }

    pub fn script_route(&self, response: Result<ApiResponse, ApiError>) {
        self.route_script.lock().push_back(response);
    }

    pub fn set_login_delay(&self, delay: Duration) {
        *self.login_delay.lock() = delay;
    }

    pub fn set_route_delay(&self, delay: Duration) {
        *self.route_delay.lock() = delay;
    }

    pub fn reject_all(&self) {
        *self.reject_all.lock() = true;
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().clone()
    }

    pub fn login_calls(&self) -> usize {
        self.requests().iter().filter(|r| r.path == "/auth/login").count()
    }

    pub fn calls_to(&self, path: &str) -> Vec<Recorded> {
        self.requests().into_iter().filter(|r| r.path == path).collect()
    }

    fn handle_login(&self) -> ApiResponse {
        if let Some(scripted) = self.login_script.lock().pop_front() {
            return scripted;
        }
        let token = self.issued_token.lock().clone();
        *self.accepted_token.lock() = Some(token.clone());
        ApiResponse::json_body(
            StatusCode::OK,
            &json!({"access_token": token, "token_type": "bearer", "expires_in": 1800}),
        )
    }

    fn handle_route(&self, request: &HttpRequest, authorization: Option<&str>) -> ApiResponse {
        let accepted = self
            .accepted_token
            .lock()
            .as_ref()
            .map(|t| format!("Bearer {}", t));
        let authorized = !*self.reject_all.lock() && accepted.is_some() && authorization == accepted.as_deref();
        if !authorized {
            return ApiResponse::json_body(
                StatusCode::UNAUTHORIZED,
                &json!({"detail": "Could not validate credentials"}),
            );
        }

        let key = (request.method.clone(), request.url.path().to_string());
        match self.routes.lock().get(&key) {
            Some(body) => ApiResponse::json_body(StatusCode::OK, body),
            None => ApiResponse::json_body(StatusCode::NOT_FOUND, &json!({"detail": "Not Found"})),
        }
    }
}

#[async_trait]
impl Transport for FakeBackend {
    async fn send(&self, request: HttpRequest) -> Result<ApiResponse, ApiError> {
        let authorization = request
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = request
            .body
            .as_ref()
            .and_then(|b| serde_json::from_slice(b).ok());
        let path = request.url.path().to_string();

        self.requests.lock().push(Recorded {
            method: request.method.clone(),
            path: path.clone(),
            authorization: authorization.clone(),
            body,
        });

        if path == "/auth/login" {
            let delay = *self.login_delay.lock();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            return Ok(self.handle_login());
        }

        let delay = *self.route_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let scripted = self.route_script.lock().pop_front();
        if let Some(scripted) = scripted {
            return scripted;
        }
        Ok(self.handle_route(&request, authorization.as_deref()))
    }
}

pub fn demo_account() -> Arc<dyn CredentialSource> {
    Arc::new(StaticCredentials::new("creator@example.com", "correct-horse"))
}

pub fn gateway_with(backend: &Arc<FakeBackend>, store: Arc<dyn TokenStore>) -> Gateway {
    Gateway::new(BASE_URL, backend.clone(), store, demo_account())
}

pub fn gateway(backend: &Arc<FakeBackend>) -> (Gateway, Arc<MemoryTokenStore>) {
    let store = Arc::new(MemoryTokenStore::new());
    (gateway_with(backend, store.clone()), store)
}
