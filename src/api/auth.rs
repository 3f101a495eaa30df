use axum::{
    Extension, Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState};
use crate::domain::UserId;
use crate::services::{LoginResult, UserInfo};

/// Session key holding the signed-in user's id.
const SESSION_USER_KEY: &str = "user_id";

/// The authenticated caller, inserted by [`auth_middleware`].
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub UserId);

#[derive(Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub username: Option<String>,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    /// Email or username
    pub login: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct ApiKeyResponse {
    pub api_key: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Authentication middleware that checks:
/// 1. Session cookie (from login or sign-up)
/// 2. `X-Api-Key` header
/// 3. `Authorization: Bearer <api_key>` header
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    let mut user = session_user(&session).await;

    if user.is_none()
        && let Some(key) = extract_api_key(&headers)
    {
        match state.auth_service.verify_api_key(&key).await {
            Ok(found) => user = found.map(|u| u.id),
            Err(e) => tracing::warn!(error = %e, "API key verification failed"),
        }
    }

    let Some(user_id) = user else {
        return ApiError::Unauthorized("Unauthorized".to_string()).into_response();
    };

    tracing::Span::current().record("user_id", user_id.value());
    request.extensions_mut().insert(CurrentUser(user_id));
    next.run(request).await
}

fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(api_key) = headers.get("X-Api-Key")
        && let Ok(key_str) = api_key.to_str()
    {
        return Some(key_str.trim().to_string());
    }

    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}

async fn session_user(session: &Session) -> Option<UserId> {
    match session.get::<UserId>(SESSION_USER_KEY).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read session");
            None
        }
    }
}

async fn start_session(session: &Session, user_id: UserId) -> Result<(), ApiError> {
    // New session id on every sign-in.
    session
        .cycle_id()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;
    session
        .insert(SESSION_USER_KEY, user_id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))
}

/// POST /auth/signup
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LoginResult>>), ApiError> {
    let result = state
        .auth_service
        .sign_up(
            &payload.email,
            payload.username.as_deref(),
            &payload.password,
        )
        .await?;

    start_session(&session, result.user.id).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(result))))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResult>>, ApiError> {
    if payload.login.trim().is_empty() {
        return Err(ApiError::validation("Email or username is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let result = state
        .auth_service
        .login(&payload.login, &payload.password)
        .await?;

    start_session(&session, result.user.id).await?;
    tracing::info!(user_id = %result.user.id, "User logged in");

    Ok(Json(ApiResponse::success(result)))
}

/// POST /auth/logout
pub async fn logout(session: Session) -> Json<ApiResponse<MessageResponse>> {
    if let Err(e) = session.flush().await {
        tracing::warn!(error = %e, "Failed to flush session");
    }

    Json(ApiResponse::success(MessageResponse {
        message: "Logged out".to_string(),
    }))
}

/// GET /auth/session
pub async fn check_session(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let user_id = session_user(&session)
        .await
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

    let user = state.auth_service.get_user(user_id).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// POST /auth/api-key/regenerate
pub async fn regenerate_api_key(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<ApiKeyResponse>>, ApiError> {
    let api_key = state.auth_service.regenerate_api_key(user_id).await?;
    Ok(Json(ApiResponse::success(ApiKeyResponse { api_key })))
}
