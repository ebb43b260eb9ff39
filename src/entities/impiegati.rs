use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "impiegati")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub servizio_id: i32,
    pub name: String,
    /// Workstation login of the employee, stored in clear.
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::servizi::Entity",
        from = "Column::ServizioId",
        to = "super::servizi::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Servizio,
    #[sea_orm(has_many = "super::accessi::Entity")]
    Accessi,
}

impl Related<super::servizi::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Servizio.def()
    }
}

impl Related<super::accessi::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accessi.def()
    }
}

impl Related<super::dispositivi::Entity> for Entity {
    fn to() -> RelationDef {
        super::accessi::Relation::Dispositivo.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::accessi::Relation::Impiegato.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
