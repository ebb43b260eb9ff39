//! Domain service for site accounts.
//!
//! Handles credential checks and the user management screens. Site accounts
//! are unrelated to the domain credentials stored on employees.

use thiserror::Error;

use crate::db::{StoreError, User};

/// Shortest password accepted for a site account.
pub const MIN_PASSWORD_LEN: usize = 4;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong password and unknown username are deliberately indistinguishable.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("User {0} not found")]
    UserNotFound(String),

    #[error("{0}")]
    Rejected(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { .. } => {
                Self::validation("username", "This username is already taken")
            }
            StoreError::NotFound { id, .. } => Self::UserNotFound(id.to_string()),
            StoreError::Rejected(msg) => Self::Rejected(msg),
            StoreError::InvalidReference { .. } => Self::Internal(err.to_string()),
            StoreError::Database(e) => Self::Database(e.to_string()),
            StoreError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Checks a username/password pair against the form rules before it is stored.
pub fn validate_credentials(username: &str, password: &str) -> Result<(), AuthError> {
    if username.trim().is_empty() {
        return Err(AuthError::validation("username", "Username is required"));
    }
    validate_password(password)
}

pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::validation(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and returns the user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if login fails, whatever the reason.
    async fn login(&self, username: &str, password: &str) -> Result<User, AuthError>;

    async fn list_users(&self) -> Result<Vec<User>, AuthError>;

    async fn get_user(&self, id: i32) -> Result<Option<User>, AuthError>;

    async fn find_user(&self, username: &str) -> Result<Option<User>, AuthError>;

    async fn add_user(&self, username: &str, password: &str) -> Result<User, AuthError>;

    /// Deletes a user on behalf of `acting_username` (`None` from the command line).
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Rejected`] for the last remaining user and for self-deletion.
    async fn delete_user(
        &self,
        id: i32,
        acting_username: Option<&str>,
    ) -> Result<User, AuthError>;

    async fn change_password(&self, id: i32, new_password: &str) -> Result<(), AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_length_counts_chars() {
        assert!(validate_password("abc").is_err());
        assert!(validate_password("abcd").is_ok());
        assert!(validate_password("èèèè").is_ok());
    }

    #[test]
    fn test_hashing_failure_is_internal() {
        let err = AuthError::from(StoreError::internal("Password hashing task failed"));
        assert!(matches!(err, AuthError::Internal(_)));
    }

    #[test]
    fn test_blank_username_rejected() {
        let err = validate_credentials("   ", "secret").unwrap_err();
        assert!(matches!(
            err,
            AuthError::Validation {
                field: "username",
                ..
            }
        ));
    }
}
