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
use crate::models::ReteDraft;

const LIST: &str = "/net_list";

fn draft(form: &FormData) -> Result<ReteDraft, FieldErrors> {
    let mut reader = form.reader();
    let draft = ReteDraft {
        name: reader.required("name"),
        address: reader.required_ipv4("address"),
        subnet: reader.prefix_length("subnet"),
        primary_dns: reader.optional_ipv4("primary_dns"),
        secondary_dns: reader.optional_ipv4("secondary_dns"),
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

    let repo = state.store().reti();
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
        "net_form.html",
        context! { action, values, errors },
    )
}

/// GET /net_list
pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response, AppError> {
    let reti = state.store().reti().list().await?;
    render::page(&user, "net_list.html", context! { reti })
}

/// GET /net_details/{id}
pub async fn details(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let (rete, dispositivi) = state
        .store()
        .reti()
        .details(id)
        .await?
        .ok_or_else(|| AppError::not_found("Rete", id))?;

    render::page(&user, "net_details.html", context! { rete, dispositivi })
}

/// GET /net_add
pub async fn add_form(Extension(user): Extension<CurrentUser>) -> Result<Response, AppError> {
    form_page(
        &user,
        StatusCode::OK,
        "/net_add",
        context! { subnet => 24 },
        &FieldErrors::new(),
    )
}

/// POST /net_add
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
            "/net_add",
            Value::from_serialize(form.values()),
            &errors,
        ),
    }
}

/// GET /net_show/{id}
pub async fn show_form(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let rete = state
        .store()
        .reti()
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Rete", id))?;

    form_page(
        &user,
        StatusCode::OK,
        &format!("/net_show/{id}"),
        Value::from_serialize(&rete),
        &FieldErrors::new(),
    )
}

/// POST /net_show/{id}
///
/// The fallback network keeps its address; only name, prefix and DNS change.
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
            &format!("/net_show/{id}"),
            Value::from_serialize(form.values()),
            &errors,
        ),
    }
}

/// GET /net_del/{id}
///
/// Devices on the network move to the fallback network.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    state.store().reti().delete(id).await?;
    Ok(Redirect::to(LIST).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_validates_addresses() {
        let form = FormData::parse(
            b"name=Uffici&address=192.168.10.0&subnet=24&primary_dns=192.168.10.1&secondary_dns=",
        );
        let parsed = draft(&form).unwrap();
        assert_eq!(parsed.subnet, 24);
        assert_eq!(parsed.primary_dns.as_deref(), Some("192.168.10.1"));
        assert_eq!(parsed.secondary_dns, None);

        let form = FormData::parse(b"name=Uffici&address=192.168.10&subnet=40");
        let errors = draft(&form).unwrap_err();
        assert!(errors.get("address").is_some());
        assert!(errors.get("subnet").is_some());
    }
}
