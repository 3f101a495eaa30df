#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;
use whatdoing::api::AppState;
use whatdoing::config::Config;

pub struct TestApp {
    pub state: Arc<AppState>,
    pub router: Router,
    pub api_key: String,
}

pub fn test_config() -> Config {
    let db_path =
        std::env::temp_dir().join(format!("whatdoing-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}?mode=rwc", db_path.display());
    config.observability.metrics_enabled = false;
    // Cheap hashing keeps the suite fast.
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_config()).await
}

pub async fn spawn_app_with(config: Config) -> TestApp {
    let state = whatdoing::api::create_app_state(config, None)
        .await
        .expect("failed to create app state");
    let router = whatdoing::api::router(state.clone());

    let api_key = sign_up(&router, "spike@bebop.example", Some("spike")).await;

    TestApp {
        state,
        router,
        api_key,
    }
}

/// Registers a user and returns their API key.
pub async fn sign_up(router: &Router, email: &str, username: Option<&str>) -> String {
    let body = serde_json::json!({
        "email": email,
        "username": username,
        "password": "swordfish-ii",
    });

    let (status, json) = send(router, "POST", "/api/auth/signup", None, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "sign-up failed: {json}");

    json["data"]["api_key"]
        .as_str()
        .expect("api key in sign-up response")
        .to_string()
}

/// Sends a JSON request and returns the status with the parsed body
/// (`Value::Null` for empty bodies).
pub async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    api_key: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = api_key {
        builder = builder.header("X-Api-Key", key);
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };

    (status, json)
}

impl TestApp {
    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        send(&self.router, "GET", uri, Some(&self.api_key), None).await
    }

    pub async fn post(&self, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        send(&self.router, "POST", uri, Some(&self.api_key), Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        send(&self.router, "PUT", uri, Some(&self.api_key), Some(body)).await
    }

    pub async fn delete(
        &self,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        send(&self.router, "DELETE", uri, Some(&self.api_key), body).await
    }

    /// Creates an anime title and returns its id.
    pub async fn create_title(&self, name: &str, episodes: Option<i32>, aliases: &[&str]) -> i64 {
        let (status, json) = self
            .post(
                "/api/titles",
                serde_json::json!({
                    "name": name,
                    "kind": "anime",
                    "episodes": episodes,
                    "aliases": aliases,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create title failed: {json}");
        json["data"]["id"].as_i64().expect("title id")
    }

    /// Adds a title to the test user's library and returns the progress id.
    pub async fn add_to_library(&self, title_id: i64) -> i64 {
        let (status, json) = self
            .post("/api/library", serde_json::json!({ "title_id": title_id }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "add to library failed: {json}");
        json["data"]["id"].as_i64().expect("progress id")
    }
}

/// Primary names of the titles in a list response, in order.
pub fn primary_names(json: &serde_json::Value) -> Vec<String> {
    json["data"]
        .as_array()
        .expect("data array")
        .iter()
        .map(|t| {
            t["name"]["name"]
                .as_str()
                .or_else(|| t["title"]["name"]["name"].as_str())
                .expect("primary name")
                .to_string()
        })
        .collect()
}
