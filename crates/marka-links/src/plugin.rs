//! Tracking links plugin for the Marka plugin system

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

use crate::handlers::{self, TrackingLinkApiDoc, TrackingLinkState};
use crate::service::TrackingLinkService;

pub struct TrackingLinksPlugin;

impl TrackingLinksPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TrackingLinksPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkaPlugin for TrackingLinksPlugin {
    fn name(&self) -> &'static str {
        "tracking-links"
    }

    fn register_services<'a>(
        &'a self,
        context: &'a ServiceRegistrationContext,
    ) -> Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send + 'a>> {
        Box::pin(async move {
            let db = context.require_service::<sea_orm::DatabaseConnection>();

            let link_service = Arc::new(TrackingLinkService::new(db));
            context.register_service(link_service);

            tracing::debug!("Tracking links plugin services registered successfully");
            Ok(())
        })
    }

    fn configure_routes(&self, context: &PluginContext) -> Option<PluginRoutes> {
        let state = Arc::new(TrackingLinkState {
            link_service: context.require_service::<TrackingLinkService>(),
            access_control: context.require_service::<AccessControl>(),
            audit_service: context.require_service::<dyn AuditLogger>(),
        });

        let router: Router = Router::new()
            .route("/tracking-links", post(handlers::create_tracking_link))
            .route("/tracking-links", get(handlers::list_tracking_links))
            .route("/tracking-links/{id}", get(handlers::get_tracking_link))
            .route(
                "/tracking-links/{id}",
                patch(handlers::update_tracking_link),
            )
            .route(
                "/tracking-links/{id}",
                delete(handlers::delete_tracking_link),
            )
            .with_state(state);

        Some(PluginRoutes { router })
    }

    fn openapi_schema(&self) -> Option<OpenApi> {
        Some(<TrackingLinkApiDoc as OpenApiTrait>::openapi())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tracking_links_plugin_name() {
        let links_plugin = TrackingLinksPlugin::new();
        assert_eq!(links_plugin.name(), "tracking-links");
    }
}
