use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation::{validate_episode, validate_progress_id};
use super::{
    AddToLibraryRequest, ApiError, ApiResponse, AppState, ListQuery, SetEpisodeRequest,
    SetStatusRequest,
};
use crate::models::ProgressEntry;

/// GET /library
pub async fn get_progress(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<ProgressEntry>>>, ApiError> {
    let entries = state
        .library_service
        .progress(user_id, &query.options())
        .await?;

    Ok(Json(ApiResponse::success(entries)))
}

/// POST /library
pub async fn add_to_library(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(payload): Json<AddToLibraryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProgressEntry>>), ApiError> {
    let entry = state
        .library_service
        .add(user_id, payload.title_id)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(entry))))
}

/// PUT /library/{id}/episode
pub async fn set_episode(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<SetEpisodeRequest>,
) -> Result<Json<ApiResponse<ProgressEntry>>, ApiError> {
    let id = validate_progress_id(id)?;
    let episode = validate_episode(payload.episode)?;

    let entry = state
        .library_service
        .set_episode(user_id, id, episode)
        .await?;

    Ok(Json(ApiResponse::success(entry)))
}

/// PUT /library/{id}/status
pub async fn set_status(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<SetStatusRequest>,
) -> Result<Json<ApiResponse<ProgressEntry>>, ApiError> {
    let id = validate_progress_id(id)?;
    let status = payload.status().ok_or_else(|| {
        ApiError::validation(format!(
            "Unknown status '{}', expected not-started, started or completed",
            payload.status
        ))
    })?;

    let entry = state
        .library_service
        .set_status(user_id, id, status)
        .await?;

    Ok(Json(ApiResponse::success(entry)))
}

/// DELETE /library/{id}
pub async fn remove_from_library(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let id = validate_progress_id(id)?;
    state.library_service.remove(user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
