use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use minijinja::context;
use std::sync::Arc;

use super::form::{FieldErrors, FormData};
use super::{AppError, AppState, CurrentUser, render};
use crate::services::{AuthError, MIN_PASSWORD_LEN};

const LIST: &str = "/user_list";

/// Splits validation failures (shown next to the field) from everything else.
fn field_errors(err: AuthError) -> Result<FieldErrors, AppError> {
    match err {
        AuthError::Validation { field, message } => Ok(FieldErrors::single(field, message)),
        other => Err(other.into()),
    }
}

/// GET /user_list
pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response, AppError> {
    let users = state.auth().list_users().await?;
    render::page(&user, "user_list.html", context! { users })
}

/// GET /user_add
pub async fn add_form(Extension(user): Extension<CurrentUser>) -> Result<Response, AppError> {
    render::page(
        &user,
        "user_form.html",
        context! {
            action => "/user_add",
            min_password_len => MIN_PASSWORD_LEN,
            values => context! {},
            errors => FieldErrors::new(),
        },
    )
}

/// POST /user_add
pub async fn add(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    form: FormData,
) -> Result<Response, AppError> {
    let username = form.raw("username");
    match state.auth().add_user(username, form.raw("password")).await {
        Ok(_) => Ok(Redirect::to(LIST).into_response()),
        Err(e) => {
            let errors = field_errors(e)?;
            render::page_with_status(
                &user,
                StatusCode::BAD_REQUEST,
                "user_form.html",
                context! {
                    action => "/user_add",
                    min_password_len => MIN_PASSWORD_LEN,
                    values => context! { username },
                    errors,
                },
            )
        }
    }
}

/// GET /user_show/{id}
///
/// Password change form.
pub async fn show_form(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let account = state
        .auth()
        .get_user(id)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))?;

    render::page(
        &user,
        "user_form.html",
        context! {
            action => format!("/user_show/{id}"),
            min_password_len => MIN_PASSWORD_LEN,
            values => context! {},
            errors => FieldErrors::new(),
            account,
        },
    )
}

/// POST /user_show/{id}
pub async fn show(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    form: FormData,
) -> Result<Response, AppError> {
    let account = state
        .auth()
        .get_user(id)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))?;

    match state.auth().change_password(id, form.raw("password")).await {
        Ok(()) => Ok(Redirect::to(LIST).into_response()),
        Err(e) => {
            let errors = field_errors(e)?;
            render::page_with_status(
                &user,
                StatusCode::BAD_REQUEST,
                "user_form.html",
                context! {
                    action => format!("/user_show/{id}"),
                    min_password_len => MIN_PASSWORD_LEN,
                    values => context! {},
                    account,
                    errors,
                },
            )
        }
    }
}

/// GET /user_del/{id}
///
/// Refuses to delete the last account and the account making the request.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    state.auth().delete_user(id, Some(&user.username)).await?;
    Ok(Redirect::to(LIST).into_response())
}
