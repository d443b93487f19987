//! Database connection and query utilities

pub use sea_orm;
mod connection;

pub use connection::{establish_connection, establish_connection_with_options, DbConnection};

// Export test utilities for use by other crates in their tests
pub mod test_utils;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestDatabase;
    use sea_orm::ConnectionTrait;

    #[tokio::test]
    async fn test_establish_connection_with_migrations() -> anyhow::Result<()> {
        let test_db = TestDatabase::new().await?;

        // establish_connection runs migrations against the target database
        let conn = establish_connection(&test_db.database_url).await?;

        let result = conn
            .query_one(sea_orm::Statement::from_string(
                sea_orm::DatabaseBackend::Postgres,
                "SELECT EXISTS (SELECT FROM information_schema.tables WHERE table_name = 'clients')".to_owned(),
            ))
            .await?;

        let exists = result
            .and_then(|row| row.try_get::<bool>("", "exists").ok())
            .unwrap_or(false);
        assert!(exists, "clients table should exist after migrations");

        Ok(())
    }
}
