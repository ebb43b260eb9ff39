use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "ordini")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub order_date: Date,
    pub order_number: String,
    pub warranty_expiry: Option<Date>,
    pub supplier: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::dispositivi::Entity")]
    Dispositivi,
}

impl Related<super::dispositivi::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dispositivi.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
