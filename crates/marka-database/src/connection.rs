//! Database connection management

use std::sync::Arc;
use std::time::Duration;

use marka_core::{ServiceError, ServiceResult};
use marka_migrations::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

pub type DbConnection = DatabaseConnection;

pub async fn establish_connection(database_url: &str) -> ServiceResult<Arc<DbConnection>> {
    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(100).min_connections(5);

    connect_and_migrate(opt).await
}

/// Connect with explicit pool settings, used by the server which reads
/// them from its configuration.
pub async fn establish_connection_with_options(
    database_url: &str,
    max_connections: u32,
    min_connections: u32,
    connect_timeout_secs: u64,
    acquire_timeout_secs: u64,
) -> ServiceResult<Arc<DbConnection>> {
    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(max_connections)
        .min_connections(min_connections)
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(acquire_timeout_secs));

    connect_and_migrate(opt).await
}

async fn connect_and_migrate(opt: ConnectOptions) -> ServiceResult<Arc<DbConnection>> {
    let db = Database::connect(opt)
        .await
        .map_err(|e| ServiceError::Database(e.to_string()))?;

    // Run migrations
    Migrator::up(&db, None)
        .await
        .map_err(|e| ServiceError::Database(e.to_string()))?;

    Ok(Arc::new(db))
}
