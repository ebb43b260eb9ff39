//! Validated inputs for the inventory tables.
//!
//! The web layer turns submitted forms into these drafts; repositories only
//! ever see values that already passed field-level validation.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnteDraft {
    pub name: String,
    pub short_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServizioDraft {
    pub ente_id: i32,
    pub name: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImpiegatoDraft {
    pub servizio_id: i32,
    pub name: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispositivoDraft {
    pub device_type: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub inv_ced: Option<i32>,
    pub inv_ente: Option<i32>,
    pub serial: Option<String>,
    pub ip: Option<String>,
    pub hostname: Option<String>,
    pub os: Option<String>,
    pub rete_id: i32,
    pub ordine_id: Option<i32>,
    /// Employees granted access; replaces the stored set wholesale on save.
    pub impiegati: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReteDraft {
    pub name: String,
    pub address: String,
    pub subnet: i32,
    pub primary_dns: Option<String>,
    pub secondary_dns: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrdineDraft {
    pub order_date: NaiveDate,
    pub order_number: String,
    pub warranty_expiry: Option<NaiveDate>,
    pub supplier: Option<String>,
}
