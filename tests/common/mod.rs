#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use bookclub::{
    AppState,
    auth::ensure_admin,
    cache::MemoryCache,
    config::Config,
    database::{MemoryBookStore, MemoryUserStore},
    routes::create_router,
};
use serde_json::Value;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub users: Arc<MemoryUserStore>,
    pub books: Arc<MemoryBookStore>,
    pub cache: Arc<MemoryCache>,
}

pub fn test_config(overrides: &[(&str, &str)]) -> Config {
    let overrides: Vec<(String, String)> = overrides
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    Config::from_lookup(move |name| {
        if let Some((_, v)) = overrides.iter().find(|(k, _)| k == name) {
            return Some(v.clone());
        }
        match name {
            "STORAGE_BACKEND" => Some("memory".into()),
            "JWT_SECRET" => Some("integration-secret".into()),
            "BCRYPT_COST" => Some("4".into()),
            _ => None,
        }
    })
    .expect("test config")
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config(&[]))
    }

    pub fn with_config(config: Config) -> Self {
        let users = Arc::new(MemoryUserStore::new());
        let books = Arc::new(MemoryBookStore::new());
        let cache = Arc::new(MemoryCache::new());
        let state = AppState::new(config, users.clone(), books.clone(), cache.clone());

        Self {
            router: create_router(state.clone()),
            state,
            users,
            books,
            cache,
        }
    }

    pub async fn seed_admin(&self, username: &str, password: &str) {
        ensure_admin(self.users.as_ref(), username, password, 4)
            .await
            .expect("seed admin");
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        self.call(request).await
    }

    pub async fn call(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible router");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, body)
    }

    /// Logs in and returns `(access_token, refresh_token)`.
    pub async fn login(&self, username: &str, password: &str) -> (String, String) {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(serde_json::json!({ "username": username, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        (
            body["access_token"].as_str().expect("access token").to_string(),
            body["refresh_token"].as_str().expect("refresh token").to_string(),
        )
    }
}
