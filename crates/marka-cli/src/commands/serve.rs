//! HTTP API server command
//!
//! Boots the plugin system, wires all feature plugins together and serves
//! the API plus Swagger UI on the configured address.

use std::future::IntoFuture;
use std::sync::Arc;

use axum::Router;
use clap::Args;
use marka_analytics::AnalyticsPlugin;
use marka_auth::AuthPlugin;
use marka_clients::ClientsPlugin;
use marka_config::{ConfigPlugin, ServerConfig};
use marka_core::plugin::PluginManager;
use marka_links::TrackingLinksPlugin;
use marka_websites::WebsitesPlugin;
use tokio::net::TcpListener;
use tracing::{debug, info};
use utoipa_swagger_ui::SwaggerUi;

#[derive(Args)]
pub struct ServeCommand {
    /// Address to bind the server to
    #[arg(long, default_value = "127.0.0.1:8000", env = "MARKA_ADDRESS")]
    pub address: String,

    /// Database connection URL
    #[arg(long, env = "MARKA_DATABASE_URL")]
    pub database_url: String,
}

impl ServeCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let server_config = Arc::new(ServerConfig::new(
            self.address.clone(),
            self.database_url.clone(),
        )?);

        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(run_server(server_config))
    }
}

fn create_openapi(plugin_manager: &PluginManager) -> anyhow::Result<utoipa::openapi::OpenApi> {
    plugin_manager
        .get_unified_openapi()
        .map_err(|e| anyhow::anyhow!("Failed to build unified OpenAPI schema: {}", e))
}

fn create_swagger_router(plugin_manager: &PluginManager) -> anyhow::Result<Router> {
    let api_doc = create_openapi(plugin_manager)?;
    Ok(Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api_doc)))
}

async fn run_server(config: Arc<ServerConfig>) -> anyhow::Result<()> {
    debug!("Initializing database connection...");
    let db = marka_database::establish_connection_with_options(
        &config.database_url,
        config.get_postgres_max_connections(),
        config.get_postgres_min_connections(),
        config.get_postgres_connect_timeout_secs(),
        config.get_postgres_acquire_timeout_secs(),
    )
    .await
    .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;

    let mut plugin_manager = PluginManager::new();

    // Core services that plugins can access
    let service_context = plugin_manager.service_context();
    service_context.register_service(db.clone());

    // Register plugins in dependency order. ConfigPlugin and AuthPlugin
    // provide services the feature plugins require.
    debug!("Registering ConfigPlugin");
    plugin_manager.register_plugin(Box::new(ConfigPlugin::new(config.clone())));

    debug!("Registering AuthPlugin");
    plugin_manager.register_plugin(Box::new(AuthPlugin::new()));

    debug!("Registering ClientsPlugin");
    plugin_manager.register_plugin(Box::new(ClientsPlugin::new()));

    debug!("Registering WebsitesPlugin");
    plugin_manager.register_plugin(Box::new(WebsitesPlugin::new()));

    debug!("Registering TrackingLinksPlugin");
    plugin_manager.register_plugin(Box::new(TrackingLinksPlugin::new()));

    debug!("Registering AnalyticsPlugin");
    plugin_manager.register_plugin(Box::new(AnalyticsPlugin::new()));

    debug!("Initializing plugins");
    plugin_manager
        .initialize_plugins()
        .await
        .map_err(|e| anyhow::anyhow!("Plugin initialization failed: {}", e))?;
    debug!("All plugins initialized successfully");

    let app = plugin_manager
        .build_application()
        .map_err(|e| anyhow::anyhow!("Failed to build application: {}", e))?
        .merge(create_swagger_router(&plugin_manager)?);

    let listener = TcpListener::bind(&config.address).await?;
    info!("Marka API server listening on {}", config.address);

    axum::serve(listener, app).into_future().await?;
    info!("Marka API server exited");
    Ok(())
}
