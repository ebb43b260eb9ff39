use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "dispositivi")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub device_type: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    /// Inventory tag assigned by the data centre
    #[sea_orm(unique)]
    pub inv_ced: Option<i32>,
    /// Inventory tag assigned by the owning ente
    #[sea_orm(unique)]
    pub inv_ente: Option<i32>,
    #[sea_orm(unique)]
    pub serial: Option<String>,
    pub ip: Option<String>,
    #[sea_orm(unique)]
    pub hostname: Option<String>,
    pub os: Option<String>,
    pub rete_id: i32,
    pub ordine_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::reti::Entity",
        from = "Column::ReteId",
        to = "super::reti::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Rete,
    #[sea_orm(
        belongs_to = "super::ordini::Entity",
        from = "Column::OrdineId",
        to = "super::ordini::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Ordine,
    #[sea_orm(has_many = "super::accessi::Entity")]
    Accessi,
}

impl Related<super::reti::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rete.def()
    }
}

impl Related<super::ordini::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ordine.def()
    }
}

impl Related<super::accessi::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accessi.def()
    }
}

impl Related<super::impiegati::Entity> for Entity {
    fn to() -> RelationDef {
        super::accessi::Relation::Impiegato.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::accessi::Relation::Dispositivo.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
