//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::config::SecurityConfig;
use crate::db::Store;
use crate::domain::UserId;
use crate::services::auth_service::{AuthError, AuthService, LoginResult, UserInfo};

const MAX_USERNAME_CHARS: usize = 64;

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }
}

/// Loose shape check: one `@`, a non-empty local part and a dotted domain.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

fn check_username(username: &str) -> Result<(), AuthError> {
    if username.is_empty() || username.chars().count() > MAX_USERNAME_CHARS {
        return Err(AuthError::Validation(format!(
            "Username must be 1 to {MAX_USERNAME_CHARS} characters"
        )));
    }
    if username.contains('@') {
        return Err(AuthError::Validation(
            "Username must not contain '@'".to_string(),
        ));
    }
    Ok(())
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn sign_up(
        &self,
        email: &str,
        username: Option<&str>,
        password: &str,
    ) -> Result<LoginResult, AuthError> {
        let email = email.trim().to_lowercase();
        if !is_plausible_email(&email) {
            return Err(AuthError::Validation("Invalid email address".to_string()));
        }

        let username = username.map(str::trim).filter(|u| !u.is_empty());
        if let Some(username) = username {
            check_username(username)?;
        }

        if password.chars().count() < self.security.min_password_length {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters",
                self.security.min_password_length
            )));
        }

        let users = self.store.user_repo();
        if users.email_exists(&email).await? {
            return Err(AuthError::EmailTaken);
        }
        if let Some(username) = username
            && users.username_exists(username).await?
        {
            return Err(AuthError::UsernameTaken);
        }

        let user = users
            .create(&email, username, password, &self.security)
            .await?;

        info!(user_id = %user.id, "User signed up");

        Ok(LoginResult {
            api_key: user.api_key.clone(),
            user: user.into(),
        })
    }

    async fn login(&self, login: &str, password: &str) -> Result<LoginResult, AuthError> {
        let login = login.trim();
        if login.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .store
            .user_repo()
            .verify_password(login, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        Ok(LoginResult {
            api_key: user.api_key.clone(),
            user: user.into(),
        })
    }

    async fn verify_api_key(&self, api_key: &str) -> Result<Option<UserInfo>, AuthError> {
        let user = self.store.verify_api_key(api_key).await?;
        Ok(user.map(UserInfo::from))
    }

    async fn get_user(&self, id: UserId) -> Result<UserInfo, AuthError> {
        self.store
            .get_user(id)
            .await?
            .map(UserInfo::from)
            .ok_or(AuthError::UserNotFound)
    }

    async fn regenerate_api_key(&self, id: UserId) -> Result<String, AuthError> {
        let api_key = self.store.user_repo().regenerate_api_key(id).await?;
        info!(user_id = %id, "API key regenerated");
        Ok(api_key)
    }
}
