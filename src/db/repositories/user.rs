use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use std::sync::OnceLock;
use tokio::task;
use tracing::{info, warn};

use crate::config::SecurityConfig;
use crate::db::error::{Result, StoreError};
use crate::entities::{prelude::*, users};

/// User data returned from repository (without sensitive password hash)
#[derive(Debug, Clone, serde::Serialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let rows = Users::find()
            .order_by_asc(users::Column::Username)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(Users::find().count(&self.conn).await?)
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = Users::find_by_id(id).one(&self.conn).await?;
        Ok(user.map(User::from))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await?;

        Ok(user.map(User::from))
    }

    /// Verifies a username/password pair and returns the user on success.
    ///
    /// An unknown username is checked against a dummy hash so both failure
    /// paths take the same time and look the same to the caller.
    /// Note: Argon2 runs in `spawn_blocking`, it would otherwise stall the runtime.
    pub async fn verify_password(&self, username: &str, password: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await?;

        let stored_hash = user
            .as_ref()
            .map_or_else(|| dummy_hash().to_string(), |u| u.password_hash.clone());
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || verify_hash(&password, &stored_hash))
            .await
            .map_err(|e| {
                StoreError::internal(format!("Password verification task failed: {e}"))
            })?;

        Ok(match user {
            Some(u) if is_valid => Some(User::from(u)),
            _ => None,
        })
    }

    pub async fn create(
        &self,
        username: &str,
        password: &str,
        config: &SecurityConfig,
    ) -> Result<User> {
        let password_hash = hash_in_background(password, config).await?;
        let now = chrono::Utc::now().to_rfc3339();

        let model = users::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(password_hash),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?;

        info!("Created user {}", model.username);
        Ok(User::from(model))
    }

    pub async fn set_password(
        &self,
        id: i32,
        new_password: &str,
        config: &SecurityConfig,
    ) -> Result<()> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| StoreError::not_found("User", id))?;

        let new_hash = hash_in_background(new_password, config).await?;
        let now = chrono::Utc::now().to_rfc3339();

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(new_hash);
        active.updated_at = Set(now);
        active.update(&self.conn).await?;

        Ok(())
    }

    /// Deletes a user unless it is the last one or the one doing the deleting.
    /// `acting_username` is `None` for offline administration.
    pub async fn delete_guarded(&self, id: i32, acting_username: Option<&str>) -> Result<User> {
        let txn = self.conn.begin().await?;

        let user = Users::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| StoreError::not_found("User", id))?;

        if acting_username == Some(user.username.as_str()) {
            warn!("Refused self-deletion of user {}", user.username);
            return Err(StoreError::rejected(
                "You cannot delete the account you are logged in with",
            ));
        }

        if Users::find().count(&txn).await? <= 1 {
            warn!("Refused deletion of the last user {}", user.username);
            return Err(StoreError::rejected("At least one user must remain"));
        }

        Users::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        info!("Deleted user {}", user.username);
        Ok(User::from(user))
    }

    /// Creates the bootstrap account when no user exists yet.
    pub async fn ensure_bootstrap_user(
        &self,
        username: &str,
        password: &str,
        config: &SecurityConfig,
    ) -> Result<bool> {
        if self.count().await? > 0 {
            return Ok(false);
        }

        match self.create(username, password, config).await {
            Ok(_) => {
                warn!("Created bootstrap user '{username}', change its password after logging in");
                Ok(true)
            }
            // Another process won the race; the invariant holds either way.
            Err(StoreError::Conflict { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

async fn hash_in_background(password: &str, config: &SecurityConfig) -> Result<String> {
    let password = password.to_string();
    let config = config.clone();
    task::spawn_blocking(move || hash_password(&password, &config))
        .await
        .map_err(|e| StoreError::internal(format!("Password hashing task failed: {e}")))?
}

/// Hash a password using Argon2id with the configured cost parameters.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| StoreError::internal(format!("Invalid Argon2 params: {e}")))?;

    let hash = Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| StoreError::internal(format!("Failed to hash password: {e}")))?;

    Ok(hash.to_string())
}

/// Checks a password against a PHC string. Parameters are read from the hash.
#[must_use]
pub fn verify_hash(password: &str, phc: &str) -> bool {
    PasswordHash::new(phc).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| {
        hash_password("not-a-real-password", &SecurityConfig::default()).unwrap_or_default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_config() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("v3n0m", &cheap_config()).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_hash("v3n0m", &hash));
        assert!(!verify_hash("venom", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same", &cheap_config()).unwrap();
        let b = hash_password("same", &cheap_config()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_garbage_hash_never_verifies() {
        assert!(!verify_hash("anything", "not-a-phc-string"));
        assert!(!verify_hash("anything", ""));
    }
}
