use crate::config::SecurityConfig;
use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod error;
pub mod migrator;
pub mod repositories;

pub use error::StoreError;
pub use repositories::dispositivo::{DispositivoDetails, DispositivoRow};
pub use repositories::ente::DeleteSummary;
pub use repositories::impiegato::{ImpiegatoDetails, ImpiegatoRow};
pub use repositories::ordine::OrdineRow;
pub use repositories::reports::{REPORTS, Report, ReportResult};
pub use repositories::rete::ReteRow;
pub use repositories::servizio::ServizioRow;
pub use repositories::stats::{DashboardStats, EnteStats};
pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    /// Seeds the rows every installation needs: the sentinel network and,
    /// on an empty users table, the bootstrap account. Safe to run on every start.
    pub async fn bootstrap(&self, security: &SecurityConfig) -> Result<()> {
        self.reti().ensure_sentinel().await?;
        self.users()
            .ensure_bootstrap_user(
                &security.bootstrap_username,
                &security.bootstrap_password,
                security,
            )
            .await?;
        Ok(())
    }

    #[must_use]
    pub fn users(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn enti(&self) -> repositories::ente::EnteRepository {
        repositories::ente::EnteRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn servizi(&self) -> repositories::servizio::ServizioRepository {
        repositories::servizio::ServizioRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn impiegati(&self) -> repositories::impiegato::ImpiegatoRepository {
        repositories::impiegato::ImpiegatoRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn dispositivi(&self) -> repositories::dispositivo::DispositivoRepository {
        repositories::dispositivo::DispositivoRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn reti(&self) -> repositories::rete::ReteRepository {
        repositories::rete::ReteRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn ordini(&self) -> repositories::ordine::OrdineRepository {
        repositories::ordine::OrdineRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn stats(&self) -> repositories::stats::StatsRepository {
        repositories::stats::StatsRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn reports(&self) -> repositories::reports::ReportRepository {
        repositories::reports::ReportRepository::new(self.conn.clone())
    }
}
