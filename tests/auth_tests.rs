mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

use common::spawn_app;

/// Sends a JSON request carrying an optional session cookie and returns the
/// status, any `Set-Cookie` pair and the parsed body.
async fn send_with_cookie(
    router: &axum::Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, Option<String>, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
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
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);

    (status, set_cookie, json)
}

#[tokio::test]
async fn test_sign_up_validation() {
    let app = spawn_app().await;

    let cases = [
        json!({ "email": "not-an-email", "password": "swordfish-ii" }),
        json!({ "email": "jet@bebop.example", "password": "short" }),
        json!({ "email": "jet@bebop.example", "username": "jet@bebop", "password": "swordfish-ii" }),
    ];

    for body in cases {
        let (status, json) =
            common::send(&app.router, "POST", "/api/auth/signup", None, Some(body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body} -> {json}");
        assert_eq!(json["success"], false);
    }
}

#[tokio::test]
async fn test_duplicate_sign_up_conflicts() {
    let app = spawn_app().await;

    let (status, _) = common::send(
        &app.router,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({ "email": "SPIKE@bebop.example", "password": "swordfish-ii" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = common::send(
        &app.router,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "email": "other@bebop.example",
            "username": "spike",
            "password": "swordfish-ii",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_session_lifecycle() {
    let app = spawn_app().await;

    let (status, _, _) = send_with_cookie(
        &app.router,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "login": "spike", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, cookie, json) = send_with_cookie(
        &app.router,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "login": "Spike@Bebop.example", "password": "swordfish-ii" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["data"]["api_key"], app.api_key);
    let cookie = cookie.expect("login sets a session cookie");

    let (status, _, json) =
        send_with_cookie(&app.router, "GET", "/api/auth/session", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["username"], "spike");

    // The session alone opens protected routes.
    let (status, _, _) =
        send_with_cookie(&app.router, "GET", "/api/titles", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) =
        send_with_cookie(&app.router, "POST", "/api/auth/logout", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) =
        send_with_cookie(&app.router, "GET", "/api/auth/session", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bearer_token_and_key_rotation() {
    let app = spawn_app().await;

    let bearer = |key: &str| {
        Request::builder()
            .uri("/api/titles")
            .header(header::AUTHORIZATION, format!("Bearer {key}"))
            .body(Body::empty())
            .unwrap()
    };

    let response = app.router.clone().oneshot(bearer(&app.api_key)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, json) = app
        .post("/api/auth/api-key/regenerate", json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    let rotated = json["data"]["api_key"].as_str().unwrap().to_string();
    assert_ne!(rotated, app.api_key);

    let response = app.router.clone().oneshot(bearer(&app.api_key)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.router.clone().oneshot(bearer(&rotated)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_is_public() {
    let app = spawn_app().await;

    let (status, json) = common::send(&app.router, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["database"], true);
    assert_eq!(json["data"]["status"], "ok");
    assert!(json["data"]["uptime_seconds"].is_u64());
}
