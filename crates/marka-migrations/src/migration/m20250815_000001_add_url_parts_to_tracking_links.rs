//! Adds decomposed URL part columns to tracking_links
//!
//! Storing the scheme, domain, destination, and path alongside the full URL
//! lets list endpoints filter on them without parsing every row.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Alias::new("tracking_links"))
                    .add_column(
                        ColumnDef::new(Alias::new("scheme"))
                            .string()
                            .not_null()
                            .default("http"),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Alias::new("tracking_links"))
                    .add_column(
                        ColumnDef::new(Alias::new("domain"))
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Alias::new("tracking_links"))
                    .add_column(
                        ColumnDef::new(Alias::new("destination"))
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Alias::new("tracking_links"))
                    .add_column(
                        ColumnDef::new(Alias::new("url_path"))
                            .string()
                            .not_null()
                            .default("/"),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tracking_links_domain")
                    .table(Alias::new("tracking_links"))
                    .col(Alias::new("domain"))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_tracking_links_domain")
                    .table(Alias::new("tracking_links"))
                    .to_owned(),
            )
            .await?;

        for column in ["url_path", "destination", "domain", "scheme"] {
            manager
                .alter_table(
                    Table::alter()
                        .table(Alias::new("tracking_links"))
                        .drop_column(Alias::new(column))
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }
}
