use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait, sea_query::Expr,
};
use tracing::{info, warn};

use super::dispositivo::count_on_network;
use crate::db::error::{Result, StoreError};
use crate::entities::reti::SENTINEL_ADDRESS;
use crate::entities::{dispositivi, prelude::*, reti};
use crate::models::ReteDraft;
use crate::models::network::{cidr, subnet_mask};

/// Name given to the catch-all network at bootstrap.
pub const SENTINEL_NAME: &str = "Sconosciuta";

/// Repository for network segments.
///
/// One network with address `0.0.0.0` always exists. Devices of a deleted
/// network are moved onto it instead of being deleted.
pub struct ReteRepository {
    conn: DatabaseConnection,
}

impl ReteRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<ReteRow>> {
        let reti = Reti::find()
            .order_by_asc(reti::Column::Address)
            .all(&self.conn)
            .await?;

        let counts: HashMap<i32, i64> = Dispositivi::find()
            .select_only()
            .column(dispositivi::Column::ReteId)
            .column_as(dispositivi::Column::Id.count(), "count")
            .group_by(dispositivi::Column::ReteId)
            .into_tuple::<(i32, i64)>()
            .all(&self.conn)
            .await?
            .into_iter()
            .collect();

        Ok(reti
            .into_iter()
            .map(|rete| {
                let device_count = counts.get(&rete.id).copied().unwrap_or(0);
                ReteRow::new(rete, device_count)
            })
            .collect())
    }

    pub async fn get(&self, id: i32) -> Result<Option<reti::Model>> {
        Ok(Reti::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn sentinel(&self) -> Result<Option<reti::Model>> {
        Ok(Reti::find()
            .filter(reti::Column::Address.eq(SENTINEL_ADDRESS))
            .one(&self.conn)
            .await?)
    }

    /// Network with its devices, for the details page.
    pub async fn details(&self, id: i32) -> Result<Option<(ReteRow, Vec<dispositivi::Model>)>> {
        let Some(rete) = self.get(id).await? else {
            return Ok(None);
        };

        let devices = Dispositivi::find()
            .filter(dispositivi::Column::ReteId.eq(id))
            .order_by_asc(dispositivi::Column::Ip)
            .all(&self.conn)
            .await?;

        let row = ReteRow::new(rete, i64::try_from(devices.len()).unwrap_or(i64::MAX));
        Ok(Some((row, devices)))
    }

    pub async fn create(&self, draft: &ReteDraft) -> Result<reti::Model> {
        let res = Reti::insert(reti::ActiveModel {
            name: Set(draft.name.clone()),
            address: Set(draft.address.clone()),
            subnet: Set(draft.subnet),
            primary_dns: Set(draft.primary_dns.clone()),
            secondary_dns: Set(draft.secondary_dns.clone()),
            ..Default::default()
        })
        .exec(&self.conn)
        .await?;

        info!("Added rete {}/{}", draft.address, draft.subnet);

        self.get(res.last_insert_id)
            .await?
            .ok_or_else(|| StoreError::not_found("Rete", res.last_insert_id))
    }

    pub async fn update(&self, id: i32, draft: &ReteDraft) -> Result<()> {
        let current = self
            .get(id)
            .await?
            .ok_or_else(|| StoreError::not_found("Rete", id))?;

        if current.is_sentinel() && draft.address != SENTINEL_ADDRESS {
            return Err(StoreError::Conflict {
                field: "address".to_string(),
                message: format!("The fallback network must keep address {SENTINEL_ADDRESS}"),
            });
        }

        Reti::update_many()
            .set(reti::ActiveModel {
                name: Set(draft.name.clone()),
                address: Set(draft.address.clone()),
                subnet: Set(draft.subnet),
                primary_dns: Set(draft.primary_dns.clone()),
                secondary_dns: Set(draft.secondary_dns.clone()),
                ..Default::default()
            })
            .filter(reti::Column::Id.eq(id))
            .exec(&self.conn)
            .await?;

        Ok(())
    }

    /// Deletes a network after moving its devices to the sentinel network.
    ///
    /// Refuses to delete the sentinel itself and the last remaining network.
    /// Returns the number of devices reassigned.
    pub async fn delete(&self, id: i32) -> Result<u64> {
        let txn = self.conn.begin().await?;

        let rete = Reti::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| StoreError::not_found("Rete", id))?;

        if Reti::find().count(&txn).await? <= 1 {
            warn!("Refused deletion of the only network {}", rete.address);
            return Err(StoreError::rejected("At least one network must remain"));
        }

        if rete.is_sentinel() {
            warn!("Refused deletion of the fallback network");
            return Err(StoreError::rejected(
                "The fallback network 0.0.0.0 cannot be deleted",
            ));
        }

        let sentinel = Reti::find()
            .filter(reti::Column::Address.eq(SENTINEL_ADDRESS))
            .one(&txn)
            .await?
            .ok_or_else(|| StoreError::internal("The fallback network is missing"))?;

        let moved = count_on_network(&txn, id).await?;
        Dispositivi::update_many()
            .col_expr(dispositivi::Column::ReteId, Expr::value(sentinel.id))
            .filter(dispositivi::Column::ReteId.eq(id))
            .exec(&txn)
            .await?;

        Reti::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        info!(
            "Deleted rete {} ({} dispositivi moved to {})",
            rete.address, moved, SENTINEL_ADDRESS
        );
        Ok(moved)
    }

    /// Inserts the sentinel network unless it already exists.
    pub async fn ensure_sentinel(&self) -> Result<reti::Model> {
        if let Some(existing) = self.sentinel().await? {
            return Ok(existing);
        }

        let draft = ReteDraft {
            name: SENTINEL_NAME.to_string(),
            address: SENTINEL_ADDRESS.to_string(),
            subnet: 0,
            primary_dns: None,
            secondary_dns: None,
        };

        match self.create(&draft).await {
            Ok(created) => {
                info!("Created fallback network {}", SENTINEL_ADDRESS);
                Ok(created)
            }
            // Lost a race with a concurrent start: the row is there now.
            Err(StoreError::Conflict { .. }) => self
                .sentinel()
                .await?
                .ok_or_else(|| StoreError::internal("The fallback network is missing")),
            Err(e) => Err(e),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ReteRow {
    pub rete: reti::Model,
    pub cidr: String,
    pub mask: String,
    pub sentinel: bool,
    pub device_count: i64,
}

impl ReteRow {
    fn new(rete: reti::Model, device_count: i64) -> Self {
        Self {
            cidr: cidr(&rete.address, rete.subnet),
            mask: subnet_mask(rete.subnet).unwrap_or_default(),
            sentinel: rete.is_sentinel(),
            device_count,
            rete,
        }
    }
}
