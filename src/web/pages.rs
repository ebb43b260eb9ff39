use axum::{
    Extension,
    response::{IntoResponse, Response},
};
use minijinja::context;

use super::{AppError, CurrentUser, render};

/// GET /pheesh
pub async fn pheesh(Extension(user): Extension<CurrentUser>) -> Result<Response, AppError> {
    render::page(&user, "pheesh.html", context! {})
}

/// GET /smecds
pub async fn smecds() -> Result<Response, AppError> {
    Ok(render::render("smecds.html", context! {})?.into_response())
}

pub async fn not_found() -> AppError {
    AppError::NotFound("Page not found".to_string())
}
