//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::SecurityConfig;
use crate::db::{Store, User};
use crate::services::auth_service::{
    AuthError, AuthService, validate_credentials, validate_password,
};

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

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let user = self.store.users().verify_password(username, password).await?;

        user.ok_or_else(|| {
            warn!("Failed login attempt for '{username}'");
            AuthError::InvalidCredentials
        })
    }

    async fn list_users(&self) -> Result<Vec<User>, AuthError> {
        Ok(self.store.users().list().await?)
    }

    async fn get_user(&self, id: i32) -> Result<Option<User>, AuthError> {
        Ok(self.store.users().get_by_id(id).await?)
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, AuthError> {
        Ok(self.store.users().get_by_username(username).await?)
    }

    async fn add_user(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let username = username.trim();
        validate_credentials(username, password)?;

        Ok(self
            .store
            .users()
            .create(username, password, &self.security)
            .await?)
    }

    async fn delete_user(
        &self,
        id: i32,
        acting_username: Option<&str>,
    ) -> Result<User, AuthError> {
        Ok(self.store.users().delete_guarded(id, acting_username).await?)
    }

    async fn change_password(&self, id: i32, new_password: &str) -> Result<(), AuthError> {
        validate_password(new_password)?;

        self.store
            .users()
            .set_password(id, new_password, &self.security)
            .await?;

        info!("Password changed for user {id}");
        Ok(())
    }
}
