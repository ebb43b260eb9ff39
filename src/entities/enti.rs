use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "enti")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub short_name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::servizi::Entity")]
    Servizi,
}

impl Related<super::servizi::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Servizi.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
