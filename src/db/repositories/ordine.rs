use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait, sea_query::Expr,
};
use tracing::info;

use crate::db::error::{Result, StoreError};
use crate::entities::{dispositivi, ordini, prelude::*};
use crate::models::OrdineDraft;

pub struct OrdineRepository {
    conn: DatabaseConnection,
}

impl OrdineRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<OrdineRow>> {
        let ordini = Ordini::find()
            .order_by_desc(ordini::Column::OrderDate)
            .all(&self.conn)
            .await?;

        let counts: HashMap<i32, i64> = Dispositivi::find()
            .select_only()
            .column(dispositivi::Column::OrdineId)
            .column_as(dispositivi::Column::Id.count(), "count")
            .filter(dispositivi::Column::OrdineId.is_not_null())
            .group_by(dispositivi::Column::OrdineId)
            .into_tuple::<(i32, i64)>()
            .all(&self.conn)
            .await?
            .into_iter()
            .collect();

        Ok(ordini
            .into_iter()
            .map(|ordine| OrdineRow {
                device_count: counts.get(&ordine.id).copied().unwrap_or(0),
                ordine,
            })
            .collect())
    }

    pub async fn get(&self, id: i32) -> Result<Option<ordini::Model>> {
        Ok(Ordini::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn details(&self, id: i32) -> Result<Option<(ordini::Model, Vec<dispositivi::Model>)>> {
        let Some(ordine) = self.get(id).await? else {
            return Ok(None);
        };

        let devices = Dispositivi::find()
            .filter(dispositivi::Column::OrdineId.eq(id))
            .order_by_asc(dispositivi::Column::DeviceType)
            .all(&self.conn)
            .await?;

        Ok(Some((ordine, devices)))
    }

    pub async fn create(&self, draft: &OrdineDraft) -> Result<ordini::Model> {
        let res = Ordini::insert(ordini::ActiveModel {
            order_date: Set(draft.order_date),
            order_number: Set(draft.order_number.clone()),
            warranty_expiry: Set(draft.warranty_expiry),
            supplier: Set(draft.supplier.clone()),
            ..Default::default()
        })
        .exec(&self.conn)
        .await?;

        info!("Added ordine {} ({})", draft.order_number, draft.order_date);

        self.get(res.last_insert_id)
            .await?
            .ok_or_else(|| StoreError::not_found("Ordine", res.last_insert_id))
    }

    pub async fn update(&self, id: i32, draft: &OrdineDraft) -> Result<()> {
        let res = Ordini::update_many()
            .set(ordini::ActiveModel {
                order_date: Set(draft.order_date),
                order_number: Set(draft.order_number.clone()),
                warranty_expiry: Set(draft.warranty_expiry),
                supplier: Set(draft.supplier.clone()),
                ..Default::default()
            })
            .filter(ordini::Column::Id.eq(id))
            .exec(&self.conn)
            .await?;

        if res.rows_affected == 0 {
            return Err(StoreError::not_found("Ordine", id));
        }
        Ok(())
    }

    /// Deletes the order. Its devices survive with the order reference cleared.
    pub async fn delete(&self, id: i32) -> Result<u64> {
        let txn = self.conn.begin().await?;

        if Ordini::find_by_id(id).one(&txn).await?.is_none() {
            return Err(StoreError::not_found("Ordine", id));
        }

        let detached = Dispositivi::update_many()
            .col_expr(dispositivi::Column::OrdineId, Expr::value(Option::<i32>::None))
            .filter(dispositivi::Column::OrdineId.eq(id))
            .exec(&txn)
            .await?
            .rows_affected;

        Ordini::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        info!("Deleted ordine {} ({} dispositivi detached)", id, detached);
        Ok(detached)
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct OrdineRow {
    pub ordine: ordini::Model,
    pub device_count: i64,
}
