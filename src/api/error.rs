use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::services::{AuthError, CatalogError, LibraryError};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    ValidationError(String),

    Conflict(String),

    InternalError(String),

    Unauthorized(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::DatabaseError(msg) => {
                tracing::error!("Database error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            Self::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
        };

        let body = ApiResponse::<()>::error(error_message);
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::TitleNotFound(_) | CatalogError::NameNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            CatalogError::DuplicateAlias { .. }
            | CatalogError::TitleExists(_)
            | CatalogError::EpisodesBelowProgress { .. } => Self::Conflict(err.to_string()),
            CatalogError::InvalidInput(msg) => Self::ValidationError(msg),
            CatalogError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl From<LibraryError> for ApiError {
    fn from(err: LibraryError) -> Self {
        match err {
            // A rejected counter write is reported like a missing row.
            LibraryError::EntryNotFound(_)
            | LibraryError::TitleNotFound(_)
            | LibraryError::Rejected(_) => Self::NotFound(err.to_string()),
            LibraryError::AlreadyInLibrary(_) => Self::Conflict(err.to_string()),
            LibraryError::InvalidInput(msg) => Self::ValidationError(msg),
            LibraryError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::UserNotFound => {
                Self::Unauthorized(err.to_string())
            }
            AuthError::UsernameTaken | AuthError::EmailTaken => Self::Conflict(err.to_string()),
            AuthError::Validation(msg) => Self::ValidationError(msg),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        Self::NotFound(format!("{resource} {id} not found"))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NameId, ProgressId, TitleId};

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn catalog_errors_map_to_status_codes() {
        assert_eq!(
            status_of(CatalogError::TitleNotFound(TitleId::new(1))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(CatalogError::DuplicateAlias {
                title_id: TitleId::new(1),
                name_id: NameId::new(2),
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(CatalogError::InvalidInput("blank".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CatalogError::Database("locked".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn rejected_progress_reads_as_not_found() {
        assert_eq!(
            status_of(LibraryError::Rejected(ProgressId::new(3))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(LibraryError::AlreadyInLibrary(TitleId::new(3))),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn auth_errors_map_to_status_codes() {
        assert_eq!(
            status_of(AuthError::InvalidCredentials),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_of(AuthError::EmailTaken), StatusCode::CONFLICT);
    }
}
