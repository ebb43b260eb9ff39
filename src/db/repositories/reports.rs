use sea_orm::{ConnectionTrait, DatabaseConnection, Statement, Value};
use tracing::info;

use crate::db::error::{Result, StoreError};

/// A named, read-only query offered by the report console.
///
/// Every column is cast to text so results render without knowing their types.
/// The optional parameter is always bound, never spliced into the SQL.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct Report {
    pub key: &'static str,
    pub title: &'static str,
    pub param_label: Option<&'static str>,
    pub columns: &'static [&'static str],
    #[serde(skip)]
    sql: &'static str,
}

pub const REPORTS: &[Report] = &[
    Report {
        key: "devices_per_network",
        title: "Dispositivi per rete",
        param_label: None,
        columns: &["Rete", "Indirizzo", "Subnet", "Dispositivi"],
        sql: "SELECT r.name, r.address, CAST(r.subnet AS TEXT), CAST(COUNT(d.id) AS TEXT) \
              FROM reti r LEFT JOIN dispositivi d ON d.rete_id = r.id \
              GROUP BY r.id, r.name, r.address, r.subnet \
              ORDER BY r.address",
    },
    Report {
        key: "devices_without_grants",
        title: "Dispositivi senza accessi",
        param_label: None,
        columns: &["Id", "Tipo", "Marca", "Modello", "Hostname"],
        sql: "SELECT CAST(d.id AS TEXT), d.device_type, d.brand, d.model, d.hostname \
              FROM dispositivi d \
              WHERE NOT EXISTS (SELECT 1 FROM accessi a WHERE a.dispositivo_id = d.id) \
              ORDER BY d.device_type, d.id",
    },
    Report {
        key: "employees_of_ente",
        title: "Impiegati di un ente",
        param_label: Some("Sigla ente"),
        columns: &["Impiegato", "Username", "Servizio", "Ente"],
        sql: "SELECT i.name, i.username, s.name, e.short_name \
              FROM impiegati i \
              JOIN servizi s ON s.id = i.servizio_id \
              JOIN enti e ON e.id = s.ente_id \
              WHERE e.short_name = ? \
              ORDER BY s.name, i.name",
    },
    Report {
        key: "warranty_expiring",
        title: "Garanzie in scadenza entro una data",
        param_label: Some("Data (AAAA-MM-GG)"),
        columns: &["Ordine", "Scadenza", "Fornitore", "Tipo", "Hostname"],
        sql: "SELECT o.order_number, CAST(o.warranty_expiry AS TEXT), o.supplier, \
                     d.device_type, d.hostname \
              FROM ordini o JOIN dispositivi d ON d.ordine_id = o.id \
              WHERE o.warranty_expiry IS NOT NULL AND o.warranty_expiry < ? \
              ORDER BY o.warranty_expiry, o.order_number",
    },
    Report {
        key: "devices_by_type",
        title: "Dispositivi per tipo",
        param_label: Some("Tipo contiene"),
        columns: &["Id", "Tipo", "Marca", "Modello", "Rete"],
        sql: "SELECT CAST(d.id AS TEXT), d.device_type, d.brand, d.model, r.name \
              FROM dispositivi d JOIN reti r ON r.id = d.rete_id \
              WHERE d.device_type LIKE '%' || ? || '%' \
              ORDER BY d.device_type, d.id",
    },
];

#[must_use]
pub fn find_report(key: &str) -> Option<&'static Report> {
    REPORTS.iter().find(|r| r.key == key)
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ReportResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

pub struct ReportRepository {
    conn: DatabaseConnection,
}

impl ReportRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Runs the report named `key`, binding `param` when the report takes one.
    pub async fn run(&self, key: &str, param: Option<&str>) -> Result<ReportResult> {
        let report =
            find_report(key).ok_or_else(|| StoreError::rejected(format!("Unknown report: {key}")))?;

        let values: Vec<Value> = match (report.param_label, param.map(str::trim)) {
            (None, _) => Vec::new(),
            (Some(label), None | Some("")) => {
                return Err(StoreError::rejected(format!("{label} is required")));
            }
            (Some(_), Some(p)) => vec![p.into()],
        };

        let backend = self.conn.get_database_backend();
        let rows = self
            .conn
            .query_all(Statement::from_sql_and_values(backend, report.sql, values))
            .await?;

        let width = report.columns.len();
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut cells = Vec::with_capacity(width);
            for idx in 0..width {
                cells.push(row.try_get_by_index::<Option<String>>(idx)?);
            }
            out.push(cells);
        }

        info!("Report {} returned {} rows", report.key, out.len());

        Ok(ReportResult {
            columns: report.columns.iter().map(ToString::to_string).collect(),
            rows: out,
        })
    }
}
