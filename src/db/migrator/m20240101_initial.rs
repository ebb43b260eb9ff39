use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{EntityTrait, Schema};

#[derive(DeriveMigrationName)]
pub struct Migration;

async fn create<E: EntityTrait>(
    manager: &SchemaManager<'_>,
    schema: &Schema,
    entity: E,
) -> Result<(), DbErr> {
    manager
        .create_table(
            schema
                .create_table_from_entity(entity)
                .if_not_exists()
                .to_owned(),
        )
        .await
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        // Parents before children so the foreign keys read top-down.
        create(manager, &schema, Users).await?;
        create(manager, &schema, Enti).await?;
        create(manager, &schema, Servizi).await?;
        create(manager, &schema, Impiegati).await?;
        create(manager, &schema, Reti).await?;
        create(manager, &schema, Ordini).await?;
        create(manager, &schema, Dispositivi).await?;
        create(manager, &schema, Accessi).await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_servizi_ente_id")
                    .table(Servizi)
                    .col(crate::entities::servizi::Column::EnteId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_impiegati_servizio_id")
                    .table(Impiegati)
                    .col(crate::entities::impiegati::Column::ServizioId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_dispositivi_rete_id")
                    .table(Dispositivi)
                    .col(crate::entities::dispositivi::Column::ReteId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_accessi_dispositivo_id")
                    .table(Accessi)
                    .col(crate::entities::accessi::Column::DispositivoId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Accessi).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Dispositivi).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Ordini).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Reti).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Impiegati).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Servizi).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Enti).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;

        Ok(())
    }
}
