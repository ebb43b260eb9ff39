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
use crate::models::DispositivoDraft;

const LIST: &str = "/disp_list";

fn draft(form: &FormData) -> Result<DispositivoDraft, FieldErrors> {
    let mut reader = form.reader();
    let draft = DispositivoDraft {
        device_type: reader.required("device_type"),
        brand: reader.optional("brand"),
        model: reader.optional("model"),
        inv_ced: reader.optional_int("inv_ced"),
        inv_ente: reader.optional_int("inv_ente"),
        serial: reader.optional("serial"),
        ip: reader.optional_ipv4("ip"),
        hostname: reader.optional("hostname"),
        os: reader.optional("os"),
        rete_id: reader.required_int("rete_id"),
        ordine_id: reader.optional_int("ordine_id"),
        impiegati: reader.grants(),
    };
    reader.finish(draft)
}

/// Saves the device and replaces its grant set in one transaction.
async fn save(
    state: &AppState,
    id: Option<i32>,
    form: &FormData,
) -> Result<Result<(), FieldErrors>, AppError> {
    let draft = match draft(form) {
        Ok(draft) => draft,
        Err(errors) => return Ok(Err(errors)),
    };

    let repo = state.store().dispositivi();
    let result = match id {
        Some(id) => repo.update(id, &draft).await,
        None => repo.create(&draft).await.map(drop),
    };

    match result {
        Ok(()) => Ok(Ok(())),
        Err(e) => FieldErrors::from_store(e).map(Err),
    }
}

/// Grant ids to pre-check when a rejected form is shown again.
fn submitted_grants(form: &FormData) -> Vec<i32> {
    form.grant_values()
        .into_iter()
        .filter_map(|v| v.trim().parse().ok())
        .collect()
}

struct FormPage<'a> {
    status: StatusCode,
    action: &'a str,
    values: Value,
    selected: Vec<i32>,
    errors: FieldErrors,
}

impl<'a> FormPage<'a> {
    fn blank(action: &'a str, values: Value, selected: Vec<i32>) -> Self {
        Self {
            status: StatusCode::OK,
            action,
            values,
            selected,
            errors: FieldErrors::new(),
        }
    }

    fn rejected(action: &'a str, form: &FormData, errors: FieldErrors) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            action,
            values: Value::from_serialize(form.values()),
            selected: submitted_grants(form),
            errors,
        }
    }

    async fn render(self, state: &AppState, user: &CurrentUser) -> Result<Response, AppError> {
        let store = state.store();
        let reti = store.reti().list().await?;
        let ordini = store.ordini().list().await?;
        let impiegati = store.impiegati().list(None).await?;

        render::page_with_status(
            user,
            self.status,
            "disp_form.html",
            context! {
                action => self.action,
                values => self.values,
                selected => self.selected,
                errors => self.errors,
                reti,
                ordini,
                impiegati,
            },
        )
    }
}

async fn list_page(
    state: &AppState,
    user: &CurrentUser,
    rete_id: Option<i32>,
) -> Result<Response, AppError> {
    let rete = match rete_id {
        Some(id) => Some(
            state
                .store()
                .reti()
                .get(id)
                .await?
                .ok_or_else(|| AppError::not_found("Rete", id))?,
        ),
        None => None,
    };

    let dispositivi = state.store().dispositivi().list(rete_id).await?;
    render::page(user, "disp_list.html", context! { dispositivi, rete })
}

/// GET /disp_list
pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response, AppError> {
    list_page(&state, &user, None).await
}

/// GET /disp_list/{rete_id}
pub async fn list_for_rete(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(rete_id): Path<i32>,
) -> Result<Response, AppError> {
    list_page(&state, &user, Some(rete_id)).await
}

/// GET /disp_details/{id}
pub async fn details(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let details = state
        .store()
        .dispositivi()
        .details(id)
        .await?
        .ok_or_else(|| AppError::not_found("Dispositivo", id))?;

    render::page(&user, "disp_details.html", context! { details })
}

/// GET /disp_add
///
/// New devices start on the fallback network.
pub async fn add_form(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response, AppError> {
    let sentinel = state.store().reti().sentinel().await?;
    let values = context! { rete_id => sentinel.map(|r| r.id) };

    FormPage::blank("/disp_add", values, Vec::new())
        .render(&state, &user)
        .await
}

/// GET /disp_clone/{id}
///
/// Add form prefilled from an existing device. Inventory tags, serial,
/// hostname and IP are left blank since they identify a single device.
pub async fn clone_form(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let repo = state.store().dispositivi();
    let source = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Dispositivo", id))?;
    let grants = repo.grants(id).await?;

    let values = context! {
        device_type => source.device_type,
        brand => source.brand,
        model => source.model,
        os => source.os,
        rete_id => source.rete_id,
        ordine_id => source.ordine_id,
    };

    FormPage::blank("/disp_add", values, grants)
        .render(&state, &user)
        .await
}

/// POST /disp_add
pub async fn add(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    form: FormData,
) -> Result<Response, AppError> {
    match save(&state, None, &form).await? {
        Ok(()) => Ok(Redirect::to(LIST).into_response()),
        Err(errors) => {
            FormPage::rejected("/disp_add", &form, errors)
                .render(&state, &user)
                .await
        }
    }
}

/// GET /disp_show/{id}
pub async fn show_form(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let repo = state.store().dispositivi();
    let device = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Dispositivo", id))?;
    let grants = repo.grants(id).await?;

    let action = format!("/disp_show/{id}");
    FormPage::blank(&action, Value::from_serialize(&device), grants)
        .render(&state, &user)
        .await
}

/// POST /disp_show/{id}
pub async fn show(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    form: FormData,
) -> Result<Response, AppError> {
    let action = format!("/disp_show/{id}");
    match save(&state, Some(id), &form).await? {
        Ok(()) => Ok(Redirect::to(LIST).into_response()),
        Err(errors) => {
            FormPage::rejected(&action, &form, errors)
                .render(&state, &user)
                .await
        }
    }
}

/// GET /disp_del/{id}
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    state.store().dispositivi().delete(id).await?;
    Ok(Redirect::to(LIST).into_response())
}
