//! Domain service for accounts and credentials.
//!
//! Session transport lives in the API layer; this service only checks and
//! issues credentials.

use serde::Serialize;
use thiserror::Error;

use crate::db::User;
use crate::domain::UserId;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Username is already taken")]
    UsernameTaken,

    #[error("Email is already registered")]
    EmailTaken,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// User info DTO for responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: UserId,
    pub email: String,
    pub username: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Returned by sign-up and login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub user: UserInfo,
    pub api_key: String,
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Registers a user.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Validation`] for a malformed email or short password
    /// - [`AuthError::EmailTaken`] / [`AuthError::UsernameTaken`] on conflicts
    async fn sign_up(
        &self,
        email: &str,
        username: Option<&str>,
        password: &str,
    ) -> Result<LoginResult, AuthError>;

    /// Verifies an email-or-username and password pair.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if login fails.
    async fn login(&self, login: &str, password: &str) -> Result<LoginResult, AuthError>;

    async fn verify_api_key(&self, api_key: &str) -> Result<Option<UserInfo>, AuthError>;

    async fn get_user(&self, id: UserId) -> Result<UserInfo, AuthError>;

    async fn regenerate_api_key(&self, id: UserId) -> Result<String, AuthError>;
}
