//! Websites plugin for the Marka plugin system
//!
//! Provides website, sitemap, and page management endpoints.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::routing::{delete, get, patch, post};
use axum::Router;
use marka_auth::AccessControl;
use marka_core::plugin::{
    MarkaPlugin, PluginContext, PluginError, PluginRoutes, ServiceRegistrationContext,
};
use marka_core::AuditLogger;
use utoipa::openapi::OpenApi;
use utoipa::OpenApi as OpenApiTrait;

use crate::handlers::{pages, sitemaps, websites, WebsiteState};
use crate::page_service::PageService;
use crate::sitemap_service::SitemapService;
use crate::website_service::WebsiteService;

pub struct WebsitesPlugin;

impl WebsitesPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WebsitesPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkaPlugin for WebsitesPlugin {
    fn name(&self) -> &'static str {
        "websites"
    }

    fn register_services<'a>(
        &'a self,
        context: &'a ServiceRegistrationContext,
    ) -> Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send + 'a>> {
        Box::pin(async move {
            let db = context.require_service::<sea_orm::DatabaseConnection>();

            let website_service = Arc::new(WebsiteService::new(db.clone()));
            context.register_service(website_service);

            let sitemap_service = Arc::new(SitemapService::new(db.clone()));
            context.register_service(sitemap_service);

            let page_service = Arc::new(PageService::new(db));
            context.register_service(page_service);

            tracing::debug!("Websites plugin services registered successfully");
            Ok(())
        })
    }

    fn configure_routes(&self, context: &PluginContext) -> Option<PluginRoutes> {
        let state = Arc::new(WebsiteState {
            website_service: context.require_service::<WebsiteService>(),
            sitemap_service: context.require_service::<SitemapService>(),
            page_service: context.require_service::<PageService>(),
            access_control: context.require_service::<AccessControl>(),
            audit_service: context.require_service::<dyn AuditLogger>(),
        });

        let router: Router = Router::new()
            .route("/websites", post(websites::create_website))
            .route("/websites", get(websites::list_websites))
            .route("/websites/{id}", get(websites::get_website))
            .route("/websites/{id}", patch(websites::update_website))
            .route("/websites/{id}", delete(websites::delete_website))
            .route(
                "/websites/{website_id}/sitemaps",
                post(sitemaps::create_sitemap),
            )
            .route(
                "/websites/{website_id}/sitemaps",
                get(sitemaps::list_sitemaps),
            )
            .route("/sitemaps/{id}", get(sitemaps::get_sitemap))
            .route("/sitemaps/{id}", patch(sitemaps::update_sitemap))
            .route("/sitemaps/{id}", delete(sitemaps::delete_sitemap))
            .route("/websites/{website_id}/pages", post(pages::create_page))
            .route("/websites/{website_id}/pages", get(pages::list_pages))
            .route("/pages/{id}", get(pages::get_page))
            .route("/pages/{id}", patch(pages::update_page))
            .route("/pages/{id}", delete(pages::delete_page))
            .with_state(state);

        Some(PluginRoutes { router })
    }

    fn openapi_schema(&self) -> Option<OpenApi> {
        let mut schema = <websites::WebsiteApiDoc as OpenApiTrait>::openapi();

        for fragment in [
            <sitemaps::SitemapApiDoc as OpenApiTrait>::openapi(),
            <pages::PageApiDoc as OpenApiTrait>::openapi(),
        ] {
            for (path, path_item) in fragment.paths.paths {
                schema.paths.paths.insert(path, path_item);
            }
            if let Some(components) = fragment.components {
                let base = schema
                    .components
                    .get_or_insert_with(|| utoipa::openapi::ComponentsBuilder::new().build());
                for (name, component) in components.schemas {
                    base.schemas.insert(name, component);
                }
            }
            if let Some(tags) = fragment.tags {
                schema.tags.get_or_insert_with(Vec::new).extend(tags);
            }
        }

        Some(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_websites_plugin_name() {
        let websites_plugin = WebsitesPlugin::new();
        assert_eq!(websites_plugin.name(), "websites");
    }
}
