//! Submitted `application/x-www-form-urlencoded` bodies.
//!
//! `axum::Form` deserialises into a struct and keeps only one value per key,
//! while the device form posts the `impiegati` field once per selected
//! employee. `FormData` keeps every pair in order.

use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::db::StoreError;
use crate::models::fields;

use super::AppError;

/// Prefix of the numbered grant fields (`utente0`, `utente1`, ...) older
/// device forms post instead of the repeated `impiegati` field.
const LEGACY_GRANT_PREFIX: &str = "utente";

#[derive(Debug, Clone, Default)]
pub struct FormData {
    pairs: Vec<(String, String)>,
}

impl FormData {
    #[must_use]
    pub fn parse(body: &[u8]) -> Self {
        Self {
            pairs: url::form_urlencoded::parse(body).into_owned().collect(),
        }
    }

    /// First value submitted under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn raw(&self, key: &str) -> &str {
        self.get(key).unwrap_or_default()
    }

    /// Checkbox semantics: present and not `off`.
    #[must_use]
    pub fn checked(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| v != "off")
    }

    /// First value per key, used to refill a form that failed validation.
    #[must_use]
    pub fn values(&self) -> BTreeMap<String, String> {
        let mut values = BTreeMap::new();
        for (k, v) in &self.pairs {
            values.entry(k.clone()).or_insert_with(|| v.clone());
        }
        values
    }

    /// Raw grant values: every `impiegati` field, then `utente0..N` up to the
    /// first missing index.
    #[must_use]
    pub fn grant_values(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.all("impiegati").collect();
        for n in 0.. {
            match self.get(&format!("{LEGACY_GRANT_PREFIX}{n}")) {
                Some(v) => out.push(v),
                None => break,
            }
        }
        out
    }

    #[must_use]
    pub const fn reader(&self) -> FormReader<'_> {
        FormReader {
            form: self,
            errors: FieldErrors::new(),
        }
    }
}

impl<S: Send + Sync> FromRequest<S> for FormData {
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;
        Ok(Self::parse(&body))
    }
}

/// Field name -> message, rendered next to the offending input.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Turns a repository failure into a field message when it is about one
    /// submitted value; anything else stays a request-level error.
    pub fn from_store(err: StoreError) -> Result<Self, AppError> {
        match err {
            StoreError::Conflict { field, message } => Ok(Self::single(field, message)),
            StoreError::InvalidReference { entity, id } => Ok(Self::single(
                reference_field(entity),
                format!("{entity} {id} does not exist"),
            )),
            other => Err(other.into()),
        }
    }
}

fn reference_field(entity: &str) -> &'static str {
    match entity {
        "Ente" => "ente_id",
        "Servizio" => "servizio_id",
        "Rete" => "rete_id",
        "Ordine" => "ordine_id",
        "Impiegato" => "impiegati",
        _ => "form",
    }
}

/// Reads typed values out of a form, collecting one message per bad field.
pub struct FormReader<'a> {
    form: &'a FormData,
    errors: FieldErrors,
}

impl FormReader<'_> {
    fn check<T: Default>(&mut self, field: &str, parsed: Result<T, String>) -> T {
        parsed.unwrap_or_else(|message| {
            self.errors.add(field, message);
            T::default()
        })
    }

    pub fn required(&mut self, field: &str) -> String {
        let parsed = fields::required_text(self.form.raw(field));
        self.check(field, parsed)
    }

    #[must_use]
    pub fn optional(&self, field: &str) -> Option<String> {
        fields::optional_text(self.form.raw(field))
    }

    pub fn optional_int(&mut self, field: &str) -> Option<i32> {
        let parsed = fields::optional_int(self.form.raw(field));
        self.check(field, parsed)
    }

    pub fn required_int(&mut self, field: &str) -> i32 {
        let parsed = fields::required_int(self.form.raw(field));
        self.check(field, parsed)
    }

    pub fn required_date(&mut self, field: &str) -> chrono::NaiveDate {
        let parsed = fields::required_date(self.form.raw(field)).map(Some);
        self.check(field, parsed).unwrap_or_default()
    }

    pub fn optional_date(&mut self, field: &str) -> Option<chrono::NaiveDate> {
        let parsed = fields::optional_date(self.form.raw(field));
        self.check(field, parsed)
    }

    pub fn required_ipv4(&mut self, field: &str) -> String {
        let parsed = fields::required_ipv4(self.form.raw(field));
        self.check(field, parsed)
    }

    pub fn optional_ipv4(&mut self, field: &str) -> Option<String> {
        let parsed = fields::optional_ipv4(self.form.raw(field));
        self.check(field, parsed)
    }

    pub fn prefix_length(&mut self, field: &str) -> i32 {
        let parsed = fields::prefix_length(self.form.raw(field));
        self.check(field, parsed)
    }

    /// Employee ids from the grant fields, duplicates removed, order kept.
    pub fn grants(&mut self) -> Vec<i32> {
        let mut ids = Vec::new();
        for raw in self.form.grant_values() {
            if raw.trim().is_empty() {
                continue;
            }
            match fields::required_int(raw) {
                Ok(id) if !ids.contains(&id) => ids.push(id),
                Ok(_) => {}
                Err(message) => self.errors.add("impiegati", message),
            }
        }
        ids
    }

    /// Hands back the value built from the form, or every collected error.
    pub fn finish<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }
}
