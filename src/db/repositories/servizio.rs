use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::info;

use super::ente::{DeleteSummary, delete_servizi};
use crate::db::error::{Result, StoreError};
use crate::entities::{enti, prelude::*, servizi};
use crate::models::ServizioDraft;

pub struct ServizioRepository {
    conn: DatabaseConnection,
}

impl ServizioRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Lists servizi with their ente, optionally restricted to one ente.
    pub async fn list(&self, ente_id: Option<i32>) -> Result<Vec<ServizioRow>> {
        let mut query = Servizi::find().find_also_related(Enti);
        if let Some(ente_id) = ente_id {
            query = query.filter(servizi::Column::EnteId.eq(ente_id));
        }

        let rows = query
            .order_by_asc(enti::Column::Name)
            .order_by_asc(servizi::Column::Name)
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(servizio, ente)| ServizioRow::new(servizio, ente))
            .collect())
    }

    pub async fn get(&self, id: i32) -> Result<Option<servizi::Model>> {
        Ok(Servizi::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn create(&self, draft: &ServizioDraft) -> Result<servizi::Model> {
        self.check_ente(draft.ente_id).await?;

        let res = Servizi::insert(servizi::ActiveModel {
            ente_id: Set(draft.ente_id),
            name: Set(draft.name.clone()),
            location: Set(draft.location.clone()),
            ..Default::default()
        })
        .exec(&self.conn)
        .await?;

        info!("Added servizio {} to ente {}", draft.name, draft.ente_id);

        self.get(res.last_insert_id)
            .await?
            .ok_or_else(|| StoreError::not_found("Servizio", res.last_insert_id))
    }

    pub async fn update(&self, id: i32, draft: &ServizioDraft) -> Result<()> {
        if self.get(id).await?.is_none() {
            return Err(StoreError::not_found("Servizio", id));
        }
        self.check_ente(draft.ente_id).await?;

        let res = Servizi::update_many()
            .set(servizi::ActiveModel {
                ente_id: Set(draft.ente_id),
                name: Set(draft.name.clone()),
                location: Set(draft.location.clone()),
                ..Default::default()
            })
            .filter(servizi::Column::Id.eq(id))
            .exec(&self.conn)
            .await?;

        if res.rows_affected == 0 {
            return Err(StoreError::not_found("Servizio", id));
        }
        Ok(())
    }

    /// Deletes the servizio, its impiegati and their access grants.
    pub async fn delete(&self, id: i32) -> Result<DeleteSummary> {
        let txn = self.conn.begin().await?;

        if Servizi::find_by_id(id).one(&txn).await?.is_none() {
            return Err(StoreError::not_found("Servizio", id));
        }

        let summary = delete_servizi(&txn, &[id]).await?;
        txn.commit().await?;

        info!(
            "Deleted servizio {} ({} impiegati, {} accessi)",
            id, summary.impiegati, summary.accessi
        );
        Ok(summary)
    }

    async fn check_ente(&self, ente_id: i32) -> Result<()> {
        if Enti::find_by_id(ente_id).one(&self.conn).await?.is_none() {
            return Err(StoreError::InvalidReference {
                entity: "Ente",
                id: ente_id,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ServizioRow {
    pub id: i32,
    pub name: String,
    pub location: Option<String>,
    pub ente_id: i32,
    pub ente_name: String,
    pub ente_short_name: String,
}

impl ServizioRow {
    fn new(servizio: servizi::Model, ente: Option<enti::Model>) -> Self {
        let (ente_name, ente_short_name) =
            ente.map_or_else(Default::default, |e| (e.name, e.short_name));
        Self {
            id: servizio.id,
            name: servizio.name,
            location: servizio.location,
            ente_id: servizio.ente_id,
            ente_name,
            ente_short_name,
        }
    }
}
