//! In-process app fixture for handler and route tests.

use axum::{
    body::{Body, Bytes},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use crate::{
    auth::{AdminAccount, ADMIN_IDENTITY},
    clock::ManualClock,
    config::DEFAULT_MAX_BODY_BYTES,
    db::MemoryStore,
    state::AppState,
};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "secret-pass";
pub const JWT_SECRET: &str = "test-secret";
pub const DOWNLOAD_BASE_URL: &str = "https://downloads.test/files";

pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub router: Router,
}

pub fn app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    ));
    let admin = AdminAccount::from_plaintext(ADMIN_USERNAME, ADMIN_PASSWORD, 4).unwrap();
    let state = AppState::new(store.clone(), JWT_SECRET, admin, clock.clone(), DOWNLOAD_BASE_URL);
    let router = crate::create_app(state.clone(), crate::configure_cors(None), DEFAULT_MAX_BODY_BYTES);

    TestApp {
        state,
        store,
        clock,
        router,
    }
}

impl TestApp {
    pub fn admin_token(&self) -> String {
        self.state.tokens.issue(ADMIN_IDENTITY).unwrap()
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Bytes) {
        let res = self.router.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes)
    }

    /// Sends an optional JSON body, with an optional bearer token, and parses
    /// the reply as JSON (`Null` for an empty body).
    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap())),
            None => req.body(Body::empty()),
        }
        .unwrap();

        let (status, bytes) = self.send(req).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}
