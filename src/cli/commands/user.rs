//! Offline account management against the configured database.

use crate::config::Config;
use crate::db::Store;
use crate::services::{AuthService, SeaOrmAuthService};

async fn auth_service(config: &Config) -> anyhow::Result<SeaOrmAuthService> {
    let store = Store::new(&config.general.database_path).await?;
    Ok(SeaOrmAuthService::new(store, config.security.clone()))
}

pub async fn cmd_user_add(config: &Config, username: &str, password: &str) -> anyhow::Result<()> {
    let auth = auth_service(config).await?;
    let user = auth.add_user(username, password).await?;
    println!("✓ Created user {} (ID: {})", user.username, user.id);
    Ok(())
}

pub async fn cmd_user_list(config: &Config) -> anyhow::Result<()> {
    let auth = auth_service(config).await?;
    let users = auth.list_users().await?;

    if users.is_empty() {
        println!("No users yet. The bootstrap account is created on first start.");
        return Ok(());
    }

    println!("Users ({} total)", users.len());
    println!("{:-<60}", "");
    for user in users {
        println!("{:>4}  {:<24} created {}", user.id, user.username, user.created_at);
    }
    Ok(())
}

pub async fn cmd_user_delete(config: &Config, username: &str) -> anyhow::Result<()> {
    let auth = auth_service(config).await?;

    let Some(user) = auth.find_user(username).await? else {
        println!("User '{username}' not found.");
        return Ok(());
    };

    auth.delete_user(user.id, None).await?;
    println!("✓ Deleted user {}", user.username);
    Ok(())
}

pub async fn cmd_user_passwd(
    config: &Config,
    username: &str,
    password: &str,
) -> anyhow::Result<()> {
    let auth = auth_service(config).await?;

    let Some(user) = auth.find_user(username).await? else {
        println!("User '{username}' not found.");
        return Ok(());
    };

    auth.change_password(user.id, password).await?;
    println!("✓ Password updated for {}", user.username);
    Ok(())
}
