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
use crate::models::EnteDraft;

const LIST: &str = "/ente_list";

fn draft(form: &FormData) -> Result<EnteDraft, FieldErrors> {
    let mut reader = form.reader();
    let name = reader.required("name");
    let short_name = reader.required("short_name");
    reader.finish(EnteDraft { name, short_name })
}

/// Creates (`id == None`) or overwrites an ente from the submitted form.
async fn save(
    state: &AppState,
    id: Option<i32>,
    form: &FormData,
) -> Result<Result<(), FieldErrors>, AppError> {
    let draft = match draft(form) {
        Ok(draft) => draft,
        Err(errors) => return Ok(Err(errors)),
    };

    let repo = state.store().enti();
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
        "ente_form.html",
        context! { action, values, errors },
    )
}

/// GET /ente_list
pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response, AppError> {
    let enti = state.store().enti().list().await?;
    render::page(&user, "ente_list.html", context! { enti })
}

/// GET /ente_add
pub async fn add_form(Extension(user): Extension<CurrentUser>) -> Result<Response, AppError> {
    form_page(
        &user,
        StatusCode::OK,
        "/ente_add",
        context! {},
        &FieldErrors::new(),
    )
}

/// POST /ente_add
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
            "/ente_add",
            Value::from_serialize(form.values()),
            &errors,
        ),
    }
}

/// GET /ente_show/{id}
pub async fn show_form(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let ente = state
        .store()
        .enti()
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Ente", id))?;

    form_page(
        &user,
        StatusCode::OK,
        &format!("/ente_show/{id}"),
        Value::from_serialize(&ente),
        &FieldErrors::new(),
    )
}

/// POST /ente_show/{id}
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
            &format!("/ente_show/{id}"),
            Value::from_serialize(form.values()),
            &errors,
        ),
    }
}

/// GET /ente_del/{id}
///
/// Takes every servizio, impiegato and access grant of the ente with it.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    state.store().enti().delete(id).await?;
    Ok(Redirect::to(LIST).into_response())
}
