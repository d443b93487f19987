use sea_orm_migration::prelude::*;

/// Initial schema: users, clients, websites, their association tables,
/// tracking links, sitemaps and pages, Google property tables, API keys,
/// and audit logs.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("users"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Alias::new("auth_id")).string().not_null())
                    .col(ColumnDef::new(Alias::new("email")).string().not_null())
                    .col(ColumnDef::new(Alias::new("username")).string().not_null())
                    .col(
                        ColumnDef::new(Alias::new("is_active"))
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Alias::new("is_verified"))
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Alias::new("is_superuser"))
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Alias::new("roles")).json_binary().not_null())
                    .col(
                        ColumnDef::new(Alias::new("scopes"))
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("updated_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_auth_id")
                    .table(Alias::new("users"))
                    .col(Alias::new("auth_id"))
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_username")
                    .table(Alias::new("users"))
                    .col(Alias::new("username"))
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create clients table
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("clients"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Alias::new("slug")).string().not_null())
                    .col(ColumnDef::new(Alias::new("title")).string().not_null())
                    .col(ColumnDef::new(Alias::new("description")).text().null())
                    .col(
                        ColumnDef::new(Alias::new("is_active"))
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("updated_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_clients_slug")
                    .table(Alias::new("clients"))
                    .col(Alias::new("slug"))
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_clients_title")
                    .table(Alias::new("clients"))
                    .col(Alias::new("title"))
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create websites table
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("websites"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Alias::new("domain")).string().not_null())
                    .col(
                        ColumnDef::new(Alias::new("is_secure"))
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Alias::new("is_active"))
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("updated_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_websites_domain")
                    .table(Alias::new("websites"))
                    .col(Alias::new("domain"))
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create user_clients association table
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("user_clients"))
                    .if_not_exists()
                    .col(ColumnDef::new(Alias::new("user_id")).uuid().not_null())
                    .col(ColumnDef::new(Alias::new("client_id")).uuid().not_null())
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(Alias::new("user_id"))
                            .col(Alias::new("client_id")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_clients_user_id")
                            .from(Alias::new("user_clients"), Alias::new("user_id"))
                            .to(Alias::new("users"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_clients_client_id")
                            .from(Alias::new("user_clients"), Alias::new("client_id"))
                            .to(Alias::new("clients"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create client_websites association table
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("client_websites"))
                    .if_not_exists()
                    .col(ColumnDef::new(Alias::new("client_id")).uuid().not_null())
                    .col(ColumnDef::new(Alias::new("website_id")).uuid().not_null())
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(Alias::new("client_id"))
                            .col(Alias::new("website_id")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_client_websites_client_id")
                            .from(Alias::new("client_websites"), Alias::new("client_id"))
                            .to(Alias::new("clients"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_client_websites_website_id")
                            .from(Alias::new("client_websites"), Alias::new("website_id"))
                            .to(Alias::new("websites"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create tracking_links table
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("tracking_links"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Alias::new("url_hash")).string().not_null())
                    .col(ColumnDef::new(Alias::new("url")).text().not_null())
                    .col(ColumnDef::new(Alias::new("utm_campaign")).string().null())
                    .col(ColumnDef::new(Alias::new("utm_medium")).string().null())
                    .col(ColumnDef::new(Alias::new("utm_source")).string().null())
                    .col(ColumnDef::new(Alias::new("utm_content")).string().null())
                    .col(ColumnDef::new(Alias::new("utm_term")).string().null())
                    .col(
                        ColumnDef::new(Alias::new("is_active"))
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Alias::new("client_id")).uuid().null())
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("updated_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tracking_links_client_id")
                            .from(Alias::new("tracking_links"), Alias::new("client_id"))
                            .to(Alias::new("clients"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tracking_links_url_hash")
                    .table(Alias::new("tracking_links"))
                    .col(Alias::new("url_hash"))
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tracking_links_client_id")
                    .table(Alias::new("tracking_links"))
                    .col(Alias::new("client_id"))
                    .to_owned(),
            )
            .await?;

        // Create website_maps table
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("website_maps"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Alias::new("url")).string().not_null())
                    .col(
                        ColumnDef::new(Alias::new("is_active"))
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Alias::new("website_id")).uuid().not_null())
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("updated_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_website_maps_website_id")
                            .from(Alias::new("website_maps"), Alias::new("website_id"))
                            .to(Alias::new("websites"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_website_maps_website_id")
                    .table(Alias::new("website_maps"))
                    .col(Alias::new("website_id"))
                    .to_owned(),
            )
            .await?;

        // Create website_pages table
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("website_pages"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("url"))
                            .string()
                            .not_null()
                            .default("/"),
                    )
                    .col(
                        ColumnDef::new(Alias::new("status"))
                            .integer()
                            .not_null()
                            .default(200),
                    )
                    .col(
                        ColumnDef::new(Alias::new("priority"))
                            .double()
                            .not_null()
                            .default(0.5),
                    )
                    .col(
                        ColumnDef::new(Alias::new("last_modified"))
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("change_frequency"))
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("is_active"))
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Alias::new("website_id")).uuid().not_null())
                    .col(ColumnDef::new(Alias::new("sitemap_id")).uuid().null())
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("updated_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_website_pages_website_id")
                            .from(Alias::new("website_pages"), Alias::new("website_id"))
                            .to(Alias::new("websites"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_website_pages_sitemap_id")
                            .from(Alias::new("website_pages"), Alias::new("sitemap_id"))
                            .to(Alias::new("website_maps"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_website_pages_website_id")
                    .table(Alias::new("website_pages"))
                    .col(Alias::new("website_id"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_website_pages_sitemap_id")
                    .table(Alias::new("website_pages"))
                    .col(Alias::new("sitemap_id"))
                    .to_owned(),
            )
            .await?;

        // Create ga4_properties table
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("ga4_properties"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Alias::new("title")).string().not_null())
                    .col(
                        ColumnDef::new(Alias::new("property_id"))
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("measurement_id"))
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alias::new("client_id")).uuid().not_null())
                    .col(ColumnDef::new(Alias::new("website_id")).uuid().not_null())
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("updated_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ga4_properties_client_id")
                            .from(Alias::new("ga4_properties"), Alias::new("client_id"))
                            .to(Alias::new("clients"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ga4_properties_website_id")
                            .from(Alias::new("ga4_properties"), Alias::new("website_id"))
                            .to(Alias::new("websites"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ga4_properties_title")
                    .table(Alias::new("ga4_properties"))
                    .col(Alias::new("title"))
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ga4_properties_measurement_id")
                    .table(Alias::new("ga4_properties"))
                    .col(Alias::new("measurement_id"))
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create ga4_streams table
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("ga4_streams"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Alias::new("title")).string().not_null())
                    .col(ColumnDef::new(Alias::new("stream_id")).string().not_null())
                    .col(
                        ColumnDef::new(Alias::new("measurement_id"))
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alias::new("ga4_id")).uuid().not_null())
                    .col(ColumnDef::new(Alias::new("website_id")).uuid().not_null())
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("updated_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ga4_streams_ga4_id")
                            .from(Alias::new("ga4_streams"), Alias::new("ga4_id"))
                            .to(Alias::new("ga4_properties"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ga4_streams_website_id")
                            .from(Alias::new("ga4_streams"), Alias::new("website_id"))
                            .to(Alias::new("websites"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ga4_streams_title")
                    .table(Alias::new("ga4_streams"))
                    .col(Alias::new("title"))
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create gsc_properties table
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("gsc_properties"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Alias::new("title")).string().not_null())
                    .col(ColumnDef::new(Alias::new("client_id")).uuid().not_null())
                    .col(ColumnDef::new(Alias::new("website_id")).uuid().not_null())
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("updated_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_gsc_properties_client_id")
                            .from(Alias::new("gsc_properties"), Alias::new("client_id"))
                            .to(Alias::new("clients"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_gsc_properties_website_id")
                            .from(Alias::new("gsc_properties"), Alias::new("website_id"))
                            .to(Alias::new("websites"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_gsc_properties_title")
                    .table(Alias::new("gsc_properties"))
                    .col(Alias::new("title"))
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create gsc_metrics table
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("gsc_metrics"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("metric_type"))
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alias::new("keys")).text().not_null())
                    .col(ColumnDef::new(Alias::new("clicks")).integer().not_null())
                    .col(
                        ColumnDef::new(Alias::new("impressions"))
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alias::new("ctr")).double().not_null())
                    .col(ColumnDef::new(Alias::new("position")).double().not_null())
                    .col(
                        ColumnDef::new(Alias::new("date_start"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("date_end"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alias::new("gsc_id")).uuid().not_null())
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("updated_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_gsc_metrics_gsc_id")
                            .from(Alias::new("gsc_metrics"), Alias::new("gsc_id"))
                            .to(Alias::new("gsc_properties"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_gsc_metrics_gsc_id")
                    .table(Alias::new("gsc_metrics"))
                    .col(Alias::new("gsc_id"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_gsc_metrics_metric_type")
                    .table(Alias::new("gsc_metrics"))
                    .col(Alias::new("metric_type"))
                    .to_owned(),
            )
            .await?;

        // Create api_keys table
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("api_keys"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Alias::new("name")).string().not_null())
                    .col(ColumnDef::new(Alias::new("key_hash")).string().not_null())
                    .col(
                        ColumnDef::new(Alias::new("key_prefix"))
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alias::new("user_id")).uuid().not_null())
                    .col(ColumnDef::new(Alias::new("role")).string().null())
                    .col(ColumnDef::new(Alias::new("scopes")).json_binary().null())
                    .col(
                        ColumnDef::new(Alias::new("is_active"))
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Alias::new("expires_at"))
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("last_used_at"))
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("updated_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_api_keys_user_id")
                            .from(Alias::new("api_keys"), Alias::new("user_id"))
                            .to(Alias::new("users"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_api_keys_key_prefix")
                    .table(Alias::new("api_keys"))
                    .col(Alias::new("key_prefix"))
                    .to_owned(),
            )
            .await?;

        // Create audit_logs table
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("audit_logs"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Alias::new("user_id")).uuid().null())
                    .col(
                        ColumnDef::new(Alias::new("operation_type"))
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("details"))
                            .json_binary()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alias::new("ip_address")).string().null())
                    .col(
                        ColumnDef::new(Alias::new("user_agent"))
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_audit_logs_user_id")
                            .from(Alias::new("audit_logs"), Alias::new("user_id"))
                            .to(Alias::new("users"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_audit_logs_user_id")
                    .table(Alias::new("audit_logs"))
                    .col(Alias::new("user_id"))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order to handle foreign key constraints
        manager
            .drop_table(Table::drop().table(Alias::new("audit_logs")).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Alias::new("api_keys")).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Alias::new("gsc_metrics")).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Alias::new("gsc_properties")).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Alias::new("ga4_streams")).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Alias::new("ga4_properties")).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Alias::new("website_pages")).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Alias::new("website_maps")).to_owned())
            .await?;

        manager
            .drop_table(
                Table::drop()
                    .table(Alias::new("tracking_links"))
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(
                Table::drop()
                    .table(Alias::new("client_websites"))
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Alias::new("user_clients")).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Alias::new("websites")).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Alias::new("clients")).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Alias::new("users")).to_owned())
            .await?;

        Ok(())
    }
}
