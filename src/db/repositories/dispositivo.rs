use std::collections::{BTreeSet, HashMap};

use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;

use crate::db::error::{Result, StoreError};
use crate::entities::{accessi, dispositivi, impiegati, ordini, prelude::*, reti};
use crate::models::DispositivoDraft;

/// Repository for devices and their access grants.
///
/// Grants are never edited on their own: every save of a device replaces its
/// whole grant set inside the same transaction as the device row.
pub struct DispositivoRepository {
    conn: DatabaseConnection,
}

impl DispositivoRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Lists devices with their network and grantee names, optionally for one network.
    pub async fn list(&self, rete_id: Option<i32>) -> Result<Vec<DispositivoRow>> {
        let mut query = Dispositivi::find().find_also_related(Reti);
        if let Some(rete_id) = rete_id {
            query = query.filter(dispositivi::Column::ReteId.eq(rete_id));
        }

        let rows = query
            .order_by_asc(dispositivi::Column::DeviceType)
            .order_by_asc(dispositivi::Column::Hostname)
            .all(&self.conn)
            .await?;

        let ids: Vec<i32> = rows.iter().map(|(d, _)| d.id).collect();
        let mut grantees = self.grantee_names(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|(device, rete)| DispositivoRow {
                rete_name: rete.map(|r| r.name).unwrap_or_default(),
                grantees: grantees.remove(&device.id).unwrap_or_default(),
                device,
            })
            .collect())
    }

    pub async fn get(&self, id: i32) -> Result<Option<dispositivi::Model>> {
        Ok(Dispositivi::find_by_id(id).one(&self.conn).await?)
    }

    /// Ids of the employees granted access to the device.
    pub async fn grants(&self, id: i32) -> Result<Vec<i32>> {
        Ok(Accessi::find()
            .select_only()
            .column(accessi::Column::ImpiegatoId)
            .filter(accessi::Column::DispositivoId.eq(id))
            .order_by_asc(accessi::Column::ImpiegatoId)
            .into_tuple()
            .all(&self.conn)
            .await?)
    }

    pub async fn details(&self, id: i32) -> Result<Option<DispositivoDetails>> {
        let Some(device) = self.get(id).await? else {
            return Ok(None);
        };

        let rete = Reti::find_by_id(device.rete_id).one(&self.conn).await?;
        let ordine = match device.ordine_id {
            Some(oid) => Ordini::find_by_id(oid).one(&self.conn).await?,
            None => None,
        };
        let grantees = Impiegati::find()
            .inner_join(Accessi)
            .filter(accessi::Column::DispositivoId.eq(id))
            .order_by_asc(impiegati::Column::Name)
            .all(&self.conn)
            .await?;

        Ok(Some(DispositivoDetails {
            device,
            rete,
            ordine,
            grantees,
        }))
    }

    pub async fn create(&self, draft: &DispositivoDraft) -> Result<dispositivi::Model> {
        let txn = self.conn.begin().await?;

        check_references(&txn, draft).await?;

        let res = Dispositivi::insert(active_model(draft)).exec(&txn).await?;
        let id = res.last_insert_id;

        let granted = replace_grants(&txn, id, &draft.impiegati).await?;
        txn.commit().await?;

        info!(
            "Added dispositivo {} {} ({} accessi)",
            id, draft.device_type, granted
        );

        self.get(id)
            .await?
            .ok_or_else(|| StoreError::not_found("Dispositivo", id))
    }

    /// Overwrites the device and replaces its grant set with `draft.impiegati`.
    pub async fn update(&self, id: i32, draft: &DispositivoDraft) -> Result<()> {
        let txn = self.conn.begin().await?;

        if Dispositivi::find_by_id(id).one(&txn).await?.is_none() {
            return Err(StoreError::not_found("Dispositivo", id));
        }
        check_references(&txn, draft).await?;

        Dispositivi::update_many()
            .set(active_model(draft))
            .filter(dispositivi::Column::Id.eq(id))
            .exec(&txn)
            .await?;

        let granted = replace_grants(&txn, id, &draft.impiegati).await?;
        txn.commit().await?;

        info!("Updated dispositivo {} ({} accessi)", id, granted);
        Ok(())
    }

    /// Deletes the device and its grants.
    pub async fn delete(&self, id: i32) -> Result<u64> {
        let txn = self.conn.begin().await?;

        if Dispositivi::find_by_id(id).one(&txn).await?.is_none() {
            return Err(StoreError::not_found("Dispositivo", id));
        }

        let accessi = Accessi::delete_many()
            .filter(accessi::Column::DispositivoId.eq(id))
            .exec(&txn)
            .await?
            .rows_affected;
        Dispositivi::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        info!("Deleted dispositivo {} ({} accessi)", id, accessi);
        Ok(accessi)
    }

    async fn grantee_names(&self, device_ids: &[i32]) -> Result<HashMap<i32, Vec<String>>> {
        if device_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Accessi::find()
            .find_also_related(Impiegati)
            .filter(accessi::Column::DispositivoId.is_in(device_ids.to_vec()))
            .order_by_asc(impiegati::Column::Name)
            .all(&self.conn)
            .await?;

        let mut map: HashMap<i32, Vec<String>> = HashMap::new();
        for (grant, impiegato) in rows {
            if let Some(impiegato) = impiegato {
                map.entry(grant.dispositivo_id)
                    .or_default()
                    .push(impiegato.name);
            }
        }
        Ok(map)
    }
}

fn active_model(draft: &DispositivoDraft) -> dispositivi::ActiveModel {
    dispositivi::ActiveModel {
        device_type: Set(draft.device_type.clone()),
        brand: Set(draft.brand.clone()),
        model: Set(draft.model.clone()),
        inv_ced: Set(draft.inv_ced),
        inv_ente: Set(draft.inv_ente),
        serial: Set(draft.serial.clone()),
        ip: Set(draft.ip.clone()),
        hostname: Set(draft.hostname.clone()),
        os: Set(draft.os.clone()),
        rete_id: Set(draft.rete_id),
        ordine_id: Set(draft.ordine_id),
        ..Default::default()
    }
}

async fn check_references<C: ConnectionTrait>(conn: &C, draft: &DispositivoDraft) -> Result<()> {
    if Reti::find_by_id(draft.rete_id).one(conn).await?.is_none() {
        return Err(StoreError::InvalidReference {
            entity: "Rete",
            id: draft.rete_id,
        });
    }

    if let Some(oid) = draft.ordine_id
        && Ordini::find_by_id(oid).one(conn).await?.is_none()
    {
        return Err(StoreError::InvalidReference {
            entity: "Ordine",
            id: oid,
        });
    }

    let wanted: BTreeSet<i32> = draft.impiegati.iter().copied().collect();
    if wanted.is_empty() {
        return Ok(());
    }

    let existing: BTreeSet<i32> = Impiegati::find()
        .select_only()
        .column(impiegati::Column::Id)
        .filter(impiegati::Column::Id.is_in(wanted.iter().copied()))
        .into_tuple::<i32>()
        .all(conn)
        .await?
        .into_iter()
        .collect();

    if let Some(missing) = wanted.difference(&existing).next() {
        return Err(StoreError::InvalidReference {
            entity: "Impiegato",
            id: *missing,
        });
    }
    Ok(())
}

/// Deletes every grant of the device and inserts one per distinct employee id.
/// No diffing: concurrent edits of the same device are last-writer-wins.
async fn replace_grants<C: ConnectionTrait>(
    conn: &C,
    device_id: i32,
    impiegato_ids: &[i32],
) -> Result<usize> {
    Accessi::delete_many()
        .filter(accessi::Column::DispositivoId.eq(device_id))
        .exec(conn)
        .await?;

    let wanted: BTreeSet<i32> = impiegato_ids.iter().copied().collect();
    if wanted.is_empty() {
        return Ok(0);
    }

    let models: Vec<accessi::ActiveModel> = wanted
        .iter()
        .map(|impiegato_id| accessi::ActiveModel {
            impiegato_id: Set(*impiegato_id),
            dispositivo_id: Set(device_id),
        })
        .collect();

    Accessi::insert_many(models)
        .exec_without_returning(conn)
        .await?;
    Ok(wanted.len())
}

/// Count of devices referencing a network; used by the network screens.
pub(crate) async fn count_on_network<C: ConnectionTrait>(conn: &C, rete_id: i32) -> Result<u64> {
    Ok(Dispositivi::find()
        .filter(dispositivi::Column::ReteId.eq(rete_id))
        .count(conn)
        .await?)
}

/// List row for a device. `grantees` is empty for a device nobody has access
/// to; the template renders a placeholder for that case.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DispositivoRow {
    pub device: dispositivi::Model,
    pub rete_name: String,
    pub grantees: Vec<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct DispositivoDetails {
    pub device: dispositivi::Model,
    pub rete: Option<reti::Model>,
    pub ordine: Option<ordini::Model>,
    pub grantees: Vec<impiegati::Model>,
}
