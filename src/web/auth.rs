use axum::{
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use minijinja::context;
use std::sync::Arc;
use tower_sessions::{Expiry, Session};
use tracing::{info, warn};

use super::{AppError, AppState, form::FormData, render};
use crate::services::AuthError;

/// Session key holding the signed-in username.
pub const SESSION_USER_KEY: &str = "user";

/// The signed-in account, placed in request extensions by [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub username: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Gate for every route except login, logout, credits and static assets.
///
/// Without a valid session, `GET`/`HEAD` requests are redirected to the login
/// page and any other method is refused with 403. A session whose account has
/// since been deleted is flushed.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    let username = match session.get::<String>(SESSION_USER_KEY).await {
        Ok(username) => username,
        Err(e) => {
            warn!("Session lookup failed: {e}");
            None
        }
    };

    if let Some(username) = username {
        match state.auth().find_user(&username).await {
            Ok(Some(_)) => {
                tracing::Span::current().record("user", username.as_str());
                request.extensions_mut().insert(CurrentUser { username });
                return next.run(request).await;
            }
            Ok(None) => {
                warn!("Session for deleted user '{username}' discarded");
                let _ = session.flush().await;
            }
            Err(e) => return AppError::from(e).into_response(),
        }
    }

    deny(request.method())
}

fn deny(method: &Method) -> Response {
    if method == Method::GET || method == Method::HEAD {
        Redirect::to("/login").into_response()
    } else {
        AppError::forbidden("You must be logged in").into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /
pub async fn index(session: Session) -> Redirect {
    match session.get::<String>(SESSION_USER_KEY).await {
        Ok(Some(_)) => Redirect::to("/dashboard"),
        _ => Redirect::to("/login"),
    }
}

/// GET /login
pub async fn login_page(session: Session) -> Result<Response, AppError> {
    if let Ok(Some(_)) = session.get::<String>(SESSION_USER_KEY).await {
        return Ok(Redirect::to("/dashboard").into_response());
    }
    Ok(render::render("login.html", context! {})?.into_response())
}

/// POST /login
///
/// Fields: `username`, `password`, optional `remember` checkbox.
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    form: FormData,
) -> Result<Response, AppError> {
    let username = form.raw("username").trim().to_string();
    let password = form.raw("password");

    let user = match state.auth().login(&username, password).await {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) => {
            let html = render::render(
                "login.html",
                context! { username => username, error => "Invalid username or password" },
            )?;
            return Ok((StatusCode::UNAUTHORIZED, html).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    session
        .cycle_id()
        .await
        .map_err(|e| AppError::internal(format!("Failed to create session: {e}")))?;
    session
        .insert(SESSION_USER_KEY, &user.username)
        .await
        .map_err(|e| AppError::internal(format!("Failed to create session: {e}")))?;

    if form.checked("remember") {
        let days = state.config().security.remember_me_days;
        session.set_expiry(Some(Expiry::OnInactivity(time::Duration::days(days))));
    }

    info!("User {} logged in", user.username);
    Ok(Redirect::to("/dashboard").into_response())
}

/// GET /logout
pub async fn logout(session: Session) -> Redirect {
    if let Ok(Some(username)) = session.get::<String>(SESSION_USER_KEY).await {
        info!("User {username} logged out");
    }
    let _ = session.flush().await;
    Redirect::to("/login")
}
