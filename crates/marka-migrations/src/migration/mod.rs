pub use sea_orm_migration::prelude::*;

mod m20250601_000001_initial_schema;
mod m20250815_000001_add_url_parts_to_tracking_links;
mod m20250820_000001_create_gcft_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_initial_schema::Migration),
            Box::new(m20250815_000001_add_url_parts_to_tracking_links::Migration),
            Box::new(m20250820_000001_create_gcft_tables::Migration),
        ]
    }
}
