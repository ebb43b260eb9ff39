use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "servizi")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub ente_id: i32,
    pub name: String,
    pub location: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::enti::Entity",
        from = "Column::EnteId",
        to = "super::enti::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Ente,
    #[sea_orm(has_many = "super::impiegati::Entity")]
    Impiegati,
}

impl Related<super::enti::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ente.def()
    }
}

impl Related<super::impiegati::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Impiegati.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
