use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use minijinja::{Value, context};
use std::sync::Arc;

use super::form::{FieldErrors, FormData};
use super::{AppError, AppState, CurrentUser, render};
use crate::models::OrdineDraft;

const LIST: &str = "/order_list";

fn draft(form: &FormData) -> Result<OrdineDraft, FieldErrors> {
    let mut reader = form.reader();
    let draft = OrdineDraft {
        order_date: reader.required_date("order_date"),
        order_number: reader.required("order_number"),
        warranty_expiry: reader.optional_date("warranty_expiry"),
        supplier: reader.optional("supplier"),
    };
    reader.finish(draft)
}

async fn save(
    state: &AppState,
    id: Option<i32>,
    form: &FormData,
) -> Result<Result<(), FieldErrors>, AppError> {
    let draft = match draft(form) {
        Ok(draft) => draft,
        Err(errors) => return Ok(Err(errors)),
    };

    let repo = state.store().ordini();
    let result = match id {
        Some(id) => repo.update(id, &draft).await,
        None => repo.create(&draft).await.map(drop),
    };

    match result {
        Ok(()) => Ok(Ok(())),
        Err(e) => FieldErrors::from_store(e).map(Err),
    }
}

fn form_page(
    user: &CurrentUser,
    status: StatusCode,
    action: &str,
    values: Value,
    errors: &FieldErrors,
) -> Result<Response, AppError> {
    render::page_with_status(
        user,
        status,
        "order_form.html",
        context! { action, values, errors },
    )
}

/// GET /order_list
pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response, AppError> {
    let ordini = state.store().ordini().list().await?;
    render::page(&user, "order_list.html", context! { ordini })
}

/// GET /order_details/{id}
pub async fn details(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let (ordine, dispositivi) = state
        .store()
        .ordini()
        .details(id)
        .await?
        .ok_or_else(|| AppError::not_found("Ordine", id))?;

    render::page(&user, "order_details.html", context! { ordine, dispositivi })
}

/// GET /order_add
pub async fn add_form(Extension(user): Extension<CurrentUser>) -> Result<Response, AppError> {
    let today = chrono::Local::now().date_naive().to_string();
    form_page(
        &user,
        StatusCode::OK,
        "/order_add",
        context! { order_date => today },
        &FieldErrors::new(),
    )
}

/// POST /order_add
pub async fn add(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    form: FormData,
) -> Result<Response, AppError> {
    match save(&state, None, &form).await? {
        Ok(()) => Ok(Redirect::to(LIST).into_response()),
        Err(errors) => form_page(
            &user,
            StatusCode::BAD_REQUEST,
            "/order_add",
            Value::from_serialize(form.values()),
            &errors,
        ),
    }
}

/// GET /order_show/{id}
pub async fn show_form(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let ordine = state
        .store()
        .ordini()
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Ordine", id))?;

    form_page(
        &user,
        StatusCode::OK,
        &format!("/order_show/{id}"),
        Value::from_serialize(&ordine),
        &FieldErrors::new(),
    )
}

/// POST /order_show/{id}
pub async fn show(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    form: FormData,
) -> Result<Response, AppError> {
    match save(&state, Some(id), &form).await? {
        Ok(()) => Ok(Redirect::to(LIST).into_response()),
        Err(errors) => form_page(
            &user,
            StatusCode::BAD_REQUEST,
            &format!("/order_show/{id}"),
            Value::from_serialize(form.values()),
            &errors,
        ),
    }
}

/// GET /order_del/{id}
///
/// Devices bought with the order are kept and lose the reference.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    state.store().ordini().delete(id).await?;
    Ok(Redirect::to(LIST).into_response())
}
