use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Grant of one employee on one device. The pair is the identity.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "accessi")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub impiegato_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub dispositivo_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::impiegati::Entity",
        from = "Column::ImpiegatoId",
        to = "super::impiegati::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Impiegato,
    #[sea_orm(
        belongs_to = "super::dispositivi::Entity",
        from = "Column::DispositivoId",
        to = "super::dispositivi::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Dispositivo,
}

impl Related<super::impiegati::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Impiegato.def()
    }
}

impl Related<super::dispositivi::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dispositivo.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
