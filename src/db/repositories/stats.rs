use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult, PaginatorTrait,
    QueryOrder, QuerySelect, Statement,
};

use crate::db::error::Result;
use crate::entities::{dispositivi, prelude::*};

/// Per-ente servizi/impiegati counts. Impiegati are counted transitively
/// through the ente's servizi.
const ENTE_STATS_SQL: &str = "\
SELECT e.id AS id, e.name AS name, e.short_name AS short_name, \
       COUNT(DISTINCT s.id) AS servizi, COUNT(i.id) AS impiegati \
FROM enti e \
LEFT JOIN servizi s ON s.ente_id = e.id \
LEFT JOIN impiegati i ON i.servizio_id = s.id \
GROUP BY e.id, e.name, e.short_name \
ORDER BY e.name";

/// Aggregations behind the dashboard. Recomputed on every call.
pub struct StatsRepository {
    conn: DatabaseConnection,
}

impl StatsRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn dashboard(&self) -> Result<DashboardStats> {
        let backend = self.conn.get_database_backend();
        let enti = EnteStats::find_by_statement(Statement::from_string(backend, ENTE_STATS_SQL))
            .all(&self.conn)
            .await?;

        let device_types: Vec<(String, i64)> = Dispositivi::find()
            .select_only()
            .column(dispositivi::Column::DeviceType)
            .column_as(dispositivi::Column::Id.count(), "count")
            .group_by(dispositivi::Column::DeviceType)
            .order_by_asc(dispositivi::Column::DeviceType)
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(DashboardStats {
            totals: Totals {
                enti: Enti::find().count(&self.conn).await?,
                servizi: Servizi::find().count(&self.conn).await?,
                impiegati: Impiegati::find().count(&self.conn).await?,
                dispositivi: Dispositivi::find().count(&self.conn).await?,
                reti: Reti::find().count(&self.conn).await?,
                ordini: Ordini::find().count(&self.conn).await?,
            },
            enti,
            device_types: device_types
                .into_iter()
                .map(|(device_type, count)| DeviceTypeCount { device_type, count })
                .collect(),
        })
    }
}

#[derive(Debug, Clone, FromQueryResult, serde::Serialize)]
pub struct EnteStats {
    pub id: i32,
    pub name: String,
    pub short_name: String,
    pub servizi: i64,
    pub impiegati: i64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct DeviceTypeCount {
    pub device_type: String,
    pub count: i64,
}

#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct Totals {
    pub enti: u64,
    pub servizi: u64,
    pub impiegati: u64,
    pub dispositivi: u64,
    pub reti: u64,
    pub ordini: u64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct DashboardStats {
    pub enti: Vec<EnteStats>,
    pub device_types: Vec<DeviceTypeCount>,
    pub totals: Totals,
}
