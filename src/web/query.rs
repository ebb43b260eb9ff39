//! Report console: a fixed catalogue of read-only queries.

use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::Response,
};
use minijinja::context;
use std::sync::Arc;
use tracing::warn;

use super::form::FormData;
use super::{AppError, AppState, CurrentUser, render};
use crate::db::{REPORTS, StoreError};

/// GET /query
pub async fn query_page(Extension(user): Extension<CurrentUser>) -> Result<Response, AppError> {
    render::page(&user, "query.html", context! { reports => REPORTS })
}

/// POST /query
///
/// Fields: `report` (catalogue key) and `param` for reports that take one.
/// Failures are shown on the page as-is: the console is for administrators.
pub async fn run_report(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    form: FormData,
) -> Result<Response, AppError> {
    let key = form.raw("report");
    let param = form.get("param");

    let (status, result, error) = match state.store().reports().run(key, param).await {
        Ok(result) => (StatusCode::OK, Some(result), None),
        Err(StoreError::Rejected(msg)) => (StatusCode::BAD_REQUEST, None, Some(msg)),
        Err(StoreError::Database(e)) => {
            warn!("Report {key} failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, None, Some(e.to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    render::page_with_status(
        &user,
        status,
        "query.html",
        context! {
            reports => REPORTS,
            selected => key,
            param,
            result,
            error,
        },
    )
}
