use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::migrator::Migrator;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::info;

/// Type alias for a database connection pool
pub type DbPool = DatabaseConnection;

/// Establishes the connection pool described by the application config.
pub async fn connect(cfg: &AppConfig) -> Result<DbPool, ServiceError> {
    let mut options = ConnectOptions::new(cfg.database_url.clone());
    options
        .max_connections(cfg.db_max_connections)
        .min_connections(cfg.db_min_connections)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(true);

    let pool = Database::connect(options).await?;
    info!("database connection established");
    Ok(pool)
}

/// Applies all pending embedded migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), ServiceError> {
    Migrator::up(pool, None).await?;
    info!("database migrations applied");
    Ok(())
}
