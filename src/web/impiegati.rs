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
use crate::models::ImpiegatoDraft;

const LIST: &str = "/imp_list";

fn draft(form: &FormData) -> Result<ImpiegatoDraft, FieldErrors> {
    let mut reader = form.reader();
    let servizio_id = reader.required_int("servizio_id");
    let name = reader.required("name");
    let username = reader.optional("username");
    let password = reader.optional("password");
    reader.finish(ImpiegatoDraft {
        servizio_id,
        name,
        username,
        password,
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

    let repo = state.store().impiegati();
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
    let servizi = state.store().servizi().list(None).await?;
    render::page_with_status(
        user,
        status,
        "imp_form.html",
        context! { action, values, errors, servizi },
    )
}

async fn list_page(
    state: &AppState,
    user: &CurrentUser,
    servizio_id: Option<i32>,
) -> Result<Response, AppError> {
    let servizio = match servizio_id {
        Some(id) => Some(
            state
                .store()
                .servizi()
                .get(id)
                .await?
                .ok_or_else(|| AppError::not_found("Servizio", id))?,
        ),
        None => None,
    };

    let impiegati = state.store().impiegati().list(servizio_id).await?;
    render::page(user, "imp_list.html", context! { impiegati, servizio })
}

/// GET /imp_list
pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response, AppError> {
    list_page(&state, &user, None).await
}

/// GET /imp_list/{servizio_id}
pub async fn list_for_servizio(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(servizio_id): Path<i32>,
) -> Result<Response, AppError> {
    list_page(&state, &user, Some(servizio_id)).await
}

/// GET /imp_details/{id}
pub async fn details(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let details = state
        .store()
        .impiegati()
        .details(id)
        .await?
        .ok_or_else(|| AppError::not_found("Impiegato", id))?;

    render::page(&user, "imp_details.html", context! { details })
}

/// GET /imp_add
pub async fn add_form(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response, AppError> {
    form_page(
        &state,
        &user,
        StatusCode::OK,
        "/imp_add",
        context! {},
        &FieldErrors::new(),
    )
    .await
}

/// POST /imp_add
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
                "/imp_add",
                Value::from_serialize(form.values()),
                &errors,
            )
            .await
        }
    }
}

/// GET /imp_show/{id}
pub async fn show_form(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let impiegato = state
        .store()
        .impiegati()
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Impiegato", id))?;

    form_page(
        &state,
        &user,
        StatusCode::OK,
        &format!("/imp_show/{id}"),
        Value::from_serialize(&impiegato),
        &FieldErrors::new(),
    )
    .await
}

/// POST /imp_show/{id}
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
                &format!("/imp_show/{id}"),
                Value::from_serialize(form.values()),
                &errors,
            )
            .await
        }
    }
}

/// GET /imp_del/{id}
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    state.store().impiegati().delete(id).await?;
    Ok(Redirect::to(LIST).into_response())
}
