use anyhow::Context;
use axum::{Router, middleware, routing::get};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tower_sessions::{
    Expiry, SessionManagerLayer,
    cookie::{Key, SameSite},
    session_store::ExpiredDeletion,
};
use tower_sessions_sqlx_store::SqliteStore;
use tracing::{info, warn};

use crate::config::{Config, SecurityConfig};
use crate::services::AuthService;
use crate::state::SharedState;

mod assets;
pub mod auth;
mod dashboard;
mod dispositivi;
mod enti;
mod error;
pub mod form;
mod impiegati;
mod observability;
mod ordini;
mod pages;
mod query;
mod render;
mod reti;
mod servizi;
mod users;

pub use auth::CurrentUser;
pub use error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }
}

pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

/// Cookie signing key from the configured secret, or a throwaway one.
fn session_key(security: &SecurityConfig) -> anyhow::Result<Key> {
    match &security.session_secret {
        Some(secret) => Key::try_from(secret.as_bytes())
            .map_err(|e| anyhow::anyhow!("Invalid session secret: {e}")),
        None => {
            warn!(
                "No session secret configured, sessions will not survive a restart (set {})",
                crate::config::SESSION_SECRET_ENV
            );
            Ok(Key::generate())
        }
    }
}

pub async fn router(state: Arc<AppState>) -> anyhow::Result<Router> {
    let config = state.config().clone();

    let session_store = SqliteStore::new(state.store().conn.get_sqlite_connection_pool().clone());
    session_store
        .migrate()
        .await
        .context("Failed to migrate session store")?;
    match session_store.delete_expired().await {
        Ok(()) => info!("Expired sessions purged"),
        Err(e) => warn!("Failed to purge expired sessions: {e}"),
    }

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(config.server.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnSessionEnd)
        .with_signed(session_key(&config.security)?);

    let protected_routes = create_protected_router(state.clone());

    Ok(Router::new()
        .merge(protected_routes)
        .route("/", get(auth::index))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/smecds", get(pages::smecds))
        .route("/static/{*path}", get(assets::serve_asset))
        .fallback(pages::not_found)
        .layer(session_layer)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        )))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/dashboard", get(dashboard::dashboard))
        .route("/ente_list", get(enti::list))
        .route("/ente_add", get(enti::add_form).post(enti::add))
        .route("/ente_show/{id}", get(enti::show_form).post(enti::show))
        .route("/ente_del/{id}", get(enti::delete))
        .route("/serv_list", get(servizi::list))
        .route("/serv_list/{ente_id}", get(servizi::list_for_ente))
        .route("/serv_add", get(servizi::add_form).post(servizi::add))
        .route("/serv_show/{id}", get(servizi::show_form).post(servizi::show))
        .route("/serv_del/{id}", get(servizi::delete))
        .route("/imp_list", get(impiegati::list))
        .route("/imp_list/{servizio_id}", get(impiegati::list_for_servizio))
        .route("/imp_add", get(impiegati::add_form).post(impiegati::add))
        .route("/imp_show/{id}", get(impiegati::show_form).post(impiegati::show))
        .route("/imp_del/{id}", get(impiegati::delete))
        .route("/imp_details/{id}", get(impiegati::details))
        .route("/disp_list", get(dispositivi::list))
        .route("/disp_list/{rete_id}", get(dispositivi::list_for_rete))
        .route("/disp_add", get(dispositivi::add_form).post(dispositivi::add))
        .route(
            "/disp_show/{id}",
            get(dispositivi::show_form).post(dispositivi::show),
        )
        .route("/disp_del/{id}", get(dispositivi::delete))
        .route("/disp_clone/{id}", get(dispositivi::clone_form))
        .route("/disp_details/{id}", get(dispositivi::details))
        .route("/net_list", get(reti::list))
        .route("/net_add", get(reti::add_form).post(reti::add))
        .route("/net_show/{id}", get(reti::show_form).post(reti::show))
        .route("/net_del/{id}", get(reti::delete))
        .route("/net_details/{id}", get(reti::details))
        .route("/order_list", get(ordini::list))
        .route("/order_add", get(ordini::add_form).post(ordini::add))
        .route("/order_show/{id}", get(ordini::show_form).post(ordini::show))
        .route("/order_del/{id}", get(ordini::delete))
        .route("/order_details/{id}", get(ordini::details))
        .route("/user_list", get(users::list))
        .route("/user_add", get(users::add_form).post(users::add))
        .route("/user_show/{id}", get(users::show_form).post(users::show))
        .route("/user_del/{id}", get(users::delete))
        .route("/query", get(query::query_page).post(query::run_report))
        .route("/pheesh", get(pages::pheesh))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
