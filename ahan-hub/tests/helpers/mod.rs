//! Shared setup for ahan-hub HTTP tests

#![allow(dead_code)]

use ahan_common::config::sha256_hex;
use ahan_common::store::{CatalogStores, MemoryStore};
use ahan_hub::catalog::Catalog;
use ahan_hub::defaults::DefaultDataset;
use ahan_hub::seed::bootstrap;
use ahan_hub::session::{ConfiguredCredentials, SessionStore};
use ahan_hub::summary::DisabledTextGenerator;
use ahan_hub::{build_router, AppState};
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt; // for `oneshot`

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "open-sesame";

/// App seeded from the bundled dataset, backed by a memory store
pub struct TestApp {
    pub router: Router,
    pub backend: Arc<MemoryStore>,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_backend(Arc::new(MemoryStore::new())).await
    }

    pub async fn with_backend(backend: Arc<MemoryStore>) -> Self {
        let stores = CatalogStores::from_backend(backend.clone());
        let catalog = Arc::new(Catalog::new());
        let dataset = DefaultDataset::bundled().expect("bundled dataset");
        let report = bootstrap(&stores, &catalog, &dataset, true).await;

        let state = AppState {
            stores,
            catalog,
            // Long enough that a success notice is still visible in the response
            sessions: Arc::new(SessionStore::new(Duration::from_secs(60))),
            credentials: Arc::new(ConfiguredCredentials::new(
                ADMIN_USER,
                sha256_hex(ADMIN_PASSWORD),
            )),
            text: Arc::new(DisabledTextGenerator),
            startup: Arc::new(report),
        };

        Self {
            router: build_router(state.clone()),
            backend,
            state,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    /// Log in and return the `Cookie` header value for the admin session
    pub async fn login(&self) -> String {
        let response = self
            .send(json_request(
                "POST",
                "/login",
                None,
                serde_json::json!({"username": ADMIN_USER, "password": ADMIN_PASSWORD}),
            ))
            .await;
        assert_eq!(response.status(), 200);
        session_cookie(&response).expect("login sets a session cookie")
    }
}

pub fn request(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// `name=value` part of the response's session `Set-Cookie`, if any
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|pair| pair.trim().to_string())
}

pub async fn extract_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}
