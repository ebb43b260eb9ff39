use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use tracing::info;

use crate::db::error::{Result, StoreError};
use crate::entities::{accessi, enti, impiegati, prelude::*, servizi};
use crate::models::EnteDraft;

/// Repository for organisational entities
pub struct EnteRepository {
    conn: DatabaseConnection,
}

impl EnteRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<enti::Model>> {
        Ok(Enti::find()
            .order_by_asc(enti::Column::Name)
            .all(&self.conn)
            .await?)
    }

    pub async fn get(&self, id: i32) -> Result<Option<enti::Model>> {
        Ok(Enti::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn create(&self, draft: &EnteDraft) -> Result<enti::Model> {
        let active = enti::ActiveModel {
            name: Set(draft.name.clone()),
            short_name: Set(draft.short_name.clone()),
            ..Default::default()
        };

        let res = Enti::insert(active).exec(&self.conn).await?;
        info!("Added ente {} ({})", draft.name, res.last_insert_id);

        self.get(res.last_insert_id)
            .await?
            .ok_or_else(|| StoreError::not_found("Ente", res.last_insert_id))
    }

    pub async fn update(&self, id: i32, draft: &EnteDraft) -> Result<()> {
        let res = Enti::update_many()
            .set(enti::ActiveModel {
                name: Set(draft.name.clone()),
                short_name: Set(draft.short_name.clone()),
                ..Default::default()
            })
            .filter(enti::Column::Id.eq(id))
            .exec(&self.conn)
            .await?;

        if res.rows_affected == 0 {
            return Err(StoreError::not_found("Ente", id));
        }
        Ok(())
    }

    /// Deletes the ente together with its servizi, their impiegati and the
    /// impiegati's access grants.
    pub async fn delete(&self, id: i32) -> Result<DeleteSummary> {
        let txn = self.conn.begin().await?;

        if Enti::find_by_id(id).one(&txn).await?.is_none() {
            return Err(StoreError::not_found("Ente", id));
        }

        let servizio_ids: Vec<i32> = Servizi::find()
            .select_only()
            .column(servizi::Column::Id)
            .filter(servizi::Column::EnteId.eq(id))
            .into_tuple()
            .all(&txn)
            .await?;

        let mut summary = delete_servizi(&txn, &servizio_ids).await?;
        Enti::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        summary.enti = 1;
        info!(
            "Deleted ente {} ({} servizi, {} impiegati, {} accessi)",
            id, summary.servizi, summary.impiegati, summary.accessi
        );
        Ok(summary)
    }
}

/// Row counts removed by a cascading delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteSummary {
    pub enti: u64,
    pub servizi: u64,
    pub impiegati: u64,
    pub accessi: u64,
}

/// Removes the given servizi and everything hanging off them.
pub(crate) async fn delete_servizi<C: ConnectionTrait>(
    conn: &C,
    servizio_ids: &[i32],
) -> Result<DeleteSummary> {
    if servizio_ids.is_empty() {
        return Ok(DeleteSummary::default());
    }

    let impiegato_ids: Vec<i32> = Impiegati::find()
        .select_only()
        .column(impiegati::Column::Id)
        .filter(impiegati::Column::ServizioId.is_in(servizio_ids.to_vec()))
        .into_tuple()
        .all(conn)
        .await?;

    let mut summary = delete_impiegati(conn, &impiegato_ids).await?;

    summary.servizi = Servizi::delete_many()
        .filter(servizi::Column::Id.is_in(servizio_ids.to_vec()))
        .exec(conn)
        .await?
        .rows_affected;

    Ok(summary)
}

/// Removes the given impiegati and their access grants. Devices stay.
pub(crate) async fn delete_impiegati<C: ConnectionTrait>(
    conn: &C,
    impiegato_ids: &[i32],
) -> Result<DeleteSummary> {
    if impiegato_ids.is_empty() {
        return Ok(DeleteSummary::default());
    }

    let accessi = Accessi::delete_many()
        .filter(accessi::Column::ImpiegatoId.is_in(impiegato_ids.to_vec()))
        .exec(conn)
        .await?
        .rows_affected;

    let impiegati = Impiegati::delete_many()
        .filter(impiegati::Column::Id.is_in(impiegato_ids.to_vec()))
        .exec(conn)
        .await?
        .rows_affected;

    Ok(DeleteSummary {
        impiegati,
        accessi,
        ..DeleteSummary::default()
    })
}
