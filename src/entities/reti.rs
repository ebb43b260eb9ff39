use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Address of the catch-all network devices fall back to.
pub const SENTINEL_ADDRESS: &str = "0.0.0.0";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "reti")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub address: String,
    /// Prefix length, 0..=32
    pub subnet: i32,
    pub primary_dns: Option<String>,
    pub secondary_dns: Option<String>,
}

impl Model {
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        self.address == SENTINEL_ADDRESS
    }
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
