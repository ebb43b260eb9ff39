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
use crate::models::ServizioDraft;

const LIST: &str = "/serv_list";

fn draft(form: &FormData) -> Result<ServizioDraft, FieldErrors> {
    let mut reader = form.reader();
    let ente_id = reader.required_int("ente_id");
    let name = reader.required("name");
    let location = reader.optional("location");
    reader.finish(ServizioDraft {
        ente_id,
        name,
        location,
    })
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

    let repo = state.store().servizi();
    let result = match id {
        Some(id) => repo.update(id, &draft).await,
        None => repo.create(&draft).await.map(drop),
    };

    match result {
        Ok(()) => Ok(Ok(())),
        Err(e) => FieldErrors::from_store(e).map(Err),
    }
}

async fn form_page(
    state: &AppState,
    user: &CurrentUser,
    status: StatusCode,
    action: &str,
    values: Value,
    errors: &FieldErrors,
) -> Result<Response, AppError> {
    let enti = state.store().enti().list().await?;
    render::page_with_status(
        user,
        status,
        "serv_form.html",
        context! { action, values, errors, enti },
    )
}

async fn list_page(
    state: &AppState,
    user: &CurrentUser,
    ente_id: Option<i32>,
) -> Result<Response, AppError> {
    let ente = match ente_id {
        Some(id) => Some(
            state
                .store()
                .enti()
                .get(id)
                .await?
                .ok_or_else(|| AppError::not_found("Ente", id))?,
        ),
        None => None,
    };

    let servizi = state.store().servizi().list(ente_id).await?;
    render::page(user, "serv_list.html", context! { servizi, ente })
}

/// GET /serv_list
pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response, AppError> {
    list_page(&state, &user, None).await
}

/// GET /serv_list/{ente_id}
pub async fn list_for_ente(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(ente_id): Path<i32>,
) -> Result<Response, AppError> {
    list_page(&state, &user, Some(ente_id)).await
}

/// GET /serv_add
pub async fn add_form(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response, AppError> {
    form_page(
        &state,
        &user,
        StatusCode::OK,
        "/serv_add",
        context! {},
        &FieldErrors::new(),
    )
    .await
}

/// POST /serv_add
pub async fn add(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    form: FormData,
) -> Result<Response, AppError> {
    match save(&state, None, &form).await? {
        Ok(()) => Ok(Redirect::to(LIST).into_response()),
        Err(errors) => {
            form_page(
                &state,
                &user,
                StatusCode::BAD_REQUEST,
                "/serv_add",
                Value::from_serialize(form.values()),
                &errors,
            )
            .await
        }
    }
}

/// GET /serv_show/{id}
pub async fn show_form(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let servizio = state
        .store()
        .servizi()
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Servizio", id))?;

    form_page(
        &state,
        &user,
        StatusCode::OK,
        &format!("/serv_show/{id}"),
        Value::from_serialize(&servizio),
        &FieldErrors::new(),
    )
    .await
}

/// POST /serv_show/{id}
pub async fn show(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    form: FormData,
) -> Result<Response, AppError> {
    match save(&state, Some(id), &form).await? {
        Ok(()) => Ok(Redirect::to(LIST).into_response()),
        Err(errors) => {
            form_page(
                &state,
                &user,
                StatusCode::BAD_REQUEST,
                &format!("/serv_show/{id}"),
                Value::from_serialize(form.values()),
                &errors,
            )
            .await
        }
    }
}

/// GET /serv_del/{id}
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    state.store().servizi().delete(id).await?;
    Ok(Redirect::to(LIST).into_response())
}
