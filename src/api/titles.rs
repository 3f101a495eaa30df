use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation::validate_title_id;
use super::{
    ApiError, ApiResponse, AppState, CreateTitleRequest, ListQuery, NameQuery, NameRequest,
    NameResponse, RemoveAliasesRequest, UpdateTitleRequest,
};
use crate::db::AliasRemoval;
use crate::models::{Name, Title};
use crate::services::{ResolvedName, TitleNames};

impl From<ResolvedName> for NameResponse {
    fn from(resolved: ResolvedName) -> Self {
        Self {
            name: resolved.name,
            created: resolved.created,
        }
    }
}

/// GET /titles
pub async fn list_titles(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<Title>>>, ApiError> {
    let titles = state
        .catalog_service
        .list_titles(user_id, &query.options())
        .await?;

    Ok(Json(ApiResponse::success(titles)))
}

/// POST /titles
pub async fn create_title(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateTitleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Title>>), ApiError> {
    let title = state.catalog_service.create_title(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(title))))
}

/// GET /titles/{id}
pub async fn get_title(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Title>>, ApiError> {
    let id = validate_title_id(id)?;
    let title = state.catalog_service.get_title(id).await?;
    Ok(Json(ApiResponse::success(title)))
}

/// PUT /titles/{id}
pub async fn update_title(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateTitleRequest>,
) -> Result<Json<ApiResponse<Title>>, ApiError> {
    let id = validate_title_id(id)?;
    let title = state.catalog_service.update_title(id, payload.into()).await?;
    Ok(Json(ApiResponse::success(title)))
}

/// DELETE /titles/{id}
pub async fn delete_title(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let id = validate_title_id(id)?;
    state.catalog_service.delete_title(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /titles/{id}/names
pub async fn list_names(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<TitleNames>>, ApiError> {
    let id = validate_title_id(id)?;
    let names = state.catalog_service.list_names(id).await?;
    Ok(Json(ApiResponse::success(names)))
}

/// POST /titles/{id}/aliases
pub async fn add_alias(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<NameRequest>,
) -> Result<(StatusCode, Json<ApiResponse<NameResponse>>), ApiError> {
    let id = validate_title_id(id)?;
    let resolved = state.catalog_service.add_alias(id, &payload.name).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(resolved.into()))))
}

/// DELETE /titles/{id}/aliases
///
/// Partial success: ids without a link are listed in `failed`.
pub async fn remove_aliases(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<RemoveAliasesRequest>,
) -> Result<Json<ApiResponse<AliasRemoval>>, ApiError> {
    let id = validate_title_id(id)?;
    let report = state
        .catalog_service
        .remove_aliases(id, &payload.name_ids)
        .await?;
    Ok(Json(ApiResponse::success(report)))
}

/// POST /names
///
/// Idempotent: an existing name answers 200, a new one 201.
pub async fn resolve_name(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NameRequest>,
) -> Result<(StatusCode, Json<ApiResponse<NameResponse>>), ApiError> {
    let resolved = state.catalog_service.resolve_name(&payload.name).await?;
    let status = if resolved.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(ApiResponse::success(resolved.into()))))
}

/// GET /names?name=
pub async fn find_name(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NameQuery>,
) -> Result<Json<ApiResponse<Name>>, ApiError> {
    let name = state.catalog_service.find_name(&query.name).await?;
    Ok(Json(ApiResponse::success(name)))
}
