use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::info;

use super::ente::{DeleteSummary, delete_impiegati};
use crate::db::error::{Result, StoreError};
use crate::entities::{dispositivi, enti, impiegati, prelude::*, servizi};
use crate::models::ImpiegatoDraft;

pub struct ImpiegatoRepository {
    conn: DatabaseConnection,
}

impl ImpiegatoRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Lists impiegati with their servizio and ente, optionally for one servizio.
    pub async fn list(&self, servizio_id: Option<i32>) -> Result<Vec<ImpiegatoRow>> {
        let mut query = Impiegati::find().find_also_related(Servizi);
        if let Some(servizio_id) = servizio_id {
            query = query.filter(impiegati::Column::ServizioId.eq(servizio_id));
        }

        let rows = query
            .order_by_asc(impiegati::Column::Name)
            .all(&self.conn)
            .await?;

        let enti: HashMap<i32, enti::Model> = Enti::find()
            .all(&self.conn)
            .await?
            .into_iter()
            .map(|e| (e.id, e))
            .collect();

        Ok(rows
            .into_iter()
            .map(|(impiegato, servizio)| {
                let ente = servizio.as_ref().and_then(|s| enti.get(&s.ente_id));
                ImpiegatoRow::new(impiegato, servizio.as_ref(), ente)
            })
            .collect())
    }

    pub async fn get(&self, id: i32) -> Result<Option<impiegati::Model>> {
        Ok(Impiegati::find_by_id(id).one(&self.conn).await?)
    }

    /// Employee with its servizio, ente and the devices it may use.
    pub async fn details(&self, id: i32) -> Result<Option<ImpiegatoDetails>> {
        let Some(impiegato) = self.get(id).await? else {
            return Ok(None);
        };

        let servizio = impiegato.find_related(Servizi).one(&self.conn).await?;
        let ente = match &servizio {
            Some(s) => Enti::find_by_id(s.ente_id).one(&self.conn).await?,
            None => None,
        };
        let dispositivi = impiegato
            .find_related(Dispositivi)
            .order_by_asc(dispositivi::Column::DeviceType)
            .all(&self.conn)
            .await?;

        Ok(Some(ImpiegatoDetails {
            impiegato,
            servizio,
            ente,
            dispositivi,
        }))
    }

    pub async fn create(&self, draft: &ImpiegatoDraft) -> Result<impiegati::Model> {
        self.check_servizio(draft.servizio_id).await?;

        let res = Impiegati::insert(impiegati::ActiveModel {
            servizio_id: Set(draft.servizio_id),
            name: Set(draft.name.clone()),
            username: Set(draft.username.clone()),
            password: Set(draft.password.clone()),
            ..Default::default()
        })
        .exec(&self.conn)
        .await?;

        info!("Added impiegato {} to servizio {}", draft.name, draft.servizio_id);

        self.get(res.last_insert_id)
            .await?
            .ok_or_else(|| StoreError::not_found("Impiegato", res.last_insert_id))
    }

    pub async fn update(&self, id: i32, draft: &ImpiegatoDraft) -> Result<()> {
        if self.get(id).await?.is_none() {
            return Err(StoreError::not_found("Impiegato", id));
        }
        self.check_servizio(draft.servizio_id).await?;

        let res = Impiegati::update_many()
            .set(impiegati::ActiveModel {
                servizio_id: Set(draft.servizio_id),
                name: Set(draft.name.clone()),
                username: Set(draft.username.clone()),
                password: Set(draft.password.clone()),
                ..Default::default()
            })
            .filter(impiegati::Column::Id.eq(id))
            .exec(&self.conn)
            .await?;

        if res.rows_affected == 0 {
            return Err(StoreError::not_found("Impiegato", id));
        }
        Ok(())
    }

    /// Deletes the impiegato and its access grants; the devices are kept.
    pub async fn delete(&self, id: i32) -> Result<DeleteSummary> {
        let txn = self.conn.begin().await?;

        if Impiegati::find_by_id(id).one(&txn).await?.is_none() {
            return Err(StoreError::not_found("Impiegato", id));
        }

        let summary = delete_impiegati(&txn, &[id]).await?;
        txn.commit().await?;

        info!("Deleted impiegato {} ({} accessi)", id, summary.accessi);
        Ok(summary)
    }

    async fn check_servizio(&self, servizio_id: i32) -> Result<()> {
        if Servizi::find_by_id(servizio_id)
            .one(&self.conn)
            .await?
            .is_none()
        {
            return Err(StoreError::InvalidReference {
                entity: "Servizio",
                id: servizio_id,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ImpiegatoRow {
    pub id: i32,
    pub name: String,
    pub username: Option<String>,
    pub servizio_id: i32,
    pub servizio_name: String,
    pub ente_id: Option<i32>,
    pub ente_name: String,
    pub ente_short_name: String,
    /// `Name (Servizio, ENTE)`, shown in the device form's employee picker.
    pub label: String,
}

impl ImpiegatoRow {
    fn new(
        impiegato: impiegati::Model,
        servizio: Option<&servizi::Model>,
        ente: Option<&enti::Model>,
    ) -> Self {
        let servizio_name = servizio.map(|s| s.name.clone()).unwrap_or_default();
        let ente_short_name = ente.map(|e| e.short_name.clone()).unwrap_or_default();
        let label = if ente_short_name.is_empty() {
            format!("{} ({})", impiegato.name, servizio_name)
        } else {
            format!("{} ({}, {})", impiegato.name, servizio_name, ente_short_name)
        };

        Self {
            id: impiegato.id,
            name: impiegato.name,
            username: impiegato.username,
            servizio_id: impiegato.servizio_id,
            servizio_name,
            ente_id: ente.map(|e| e.id),
            ente_name: ente.map(|e| e.name.clone()).unwrap_or_default(),
            ente_short_name,
            label,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ImpiegatoDetails {
    pub impiegato: impiegati::Model,
    pub servizio: Option<servizi::Model>,
    pub ente: Option<enti::Model>,
    pub dispositivi: Vec<dispositivi::Model>,
}
