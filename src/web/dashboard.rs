use axum::{
    Extension,
    extract::State,
    response::Response,
};
use minijinja::context;
use std::sync::Arc;

use super::{AppError, AppState, CurrentUser, render};

/// GET /dashboard
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response, AppError> {
    let stats = state.store().stats().dashboard().await?;
    render::page(&user, "dashboard.html", context! { stats })
}
