//! Analytics plugin for the Marka plugin system
//!
//! Provides Google Analytics 4 property/stream management, Search Console
//! property/metric storage, and flythrough tour/snap storage. Credentials
//! and metrics are stored via the API; nothing is fetched from Google.

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

use crate::ga4_service::Ga4Service;
use crate::gcft_service::GcftService;
use crate::gsc_service::GscService;
use crate::handlers::{ga4, gcft, gsc, AnalyticsState};

pub struct AnalyticsPlugin;

impl AnalyticsPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AnalyticsPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkaPlugin for AnalyticsPlugin {
    fn name(&self) -> &'static str {
        "analytics"
    }

    fn register_services<'a>(
        &'a self,
        context: &'a ServiceRegistrationContext,
    ) -> Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send + 'a>> {
        Box::pin(async move {
            let db = context.require_service::<sea_orm::DatabaseConnection>();

            let ga4_service = Arc::new(Ga4Service::new(db.clone()));
            context.register_service(ga4_service);

            let gcft_service = Arc::new(GcftService::new(db.clone()));
            context.register_service(gcft_service);

            let gsc_service = Arc::new(GscService::new(db));
            context.register_service(gsc_service);

            tracing::debug!("Analytics plugin services registered successfully");
            Ok(())
        })
    }

    fn configure_routes(&self, context: &PluginContext) -> Option<PluginRoutes> {
        let state = Arc::new(AnalyticsState {
            ga4_service: context.require_service::<Ga4Service>(),
            gcft_service: context.require_service::<GcftService>(),
            gsc_service: context.require_service::<GscService>(),
            access_control: context.require_service::<AccessControl>(),
            audit_service: context.require_service::<dyn AuditLogger>(),
        });

        let router: Router = Router::new()
            .route("/ga4/properties", post(ga4::create_ga4_property))
            .route("/ga4/properties", get(ga4::list_ga4_properties))
            .route("/ga4/properties/{id}", get(ga4::get_ga4_property))
            .route("/ga4/properties/{id}", patch(ga4::update_ga4_property))
            .route("/ga4/properties/{id}", delete(ga4::delete_ga4_property))
            .route(
                "/ga4/properties/{ga4_id}/streams",
                post(ga4::create_ga4_stream),
            )
            .route(
                "/ga4/properties/{ga4_id}/streams",
                get(ga4::list_ga4_streams),
            )
            .route("/ga4/streams/{id}", get(ga4::get_ga4_stream))
            .route("/ga4/streams/{id}", patch(ga4::update_ga4_stream))
            .route("/ga4/streams/{id}", delete(ga4::delete_ga4_stream))
            .route("/gsc/properties", post(gsc::create_gsc_property))
            .route("/gsc/properties", get(gsc::list_gsc_properties))
            .route("/gsc/properties/{id}", get(gsc::get_gsc_property))
            .route("/gsc/properties/{id}", patch(gsc::update_gsc_property))
            .route("/gsc/properties/{id}", delete(gsc::delete_gsc_property))
            .route(
                "/gsc/properties/{gsc_id}/metrics",
                post(gsc::create_gsc_metric),
            )
            .route(
                "/gsc/properties/{gsc_id}/metrics",
                get(gsc::list_gsc_metrics),
            )
            .route("/gsc/metrics/{id}", get(gsc::get_gsc_metric))
            .route("/gsc/metrics/{id}", delete(gsc::delete_gsc_metric))
            .route("/gcft/tours", post(gcft::create_gcft))
            .route("/gcft/tours", get(gcft::list_gcfts))
            .route("/gcft/tours/{id}", get(gcft::get_gcft))
            .route("/gcft/tours/{id}", patch(gcft::update_gcft))
            .route("/gcft/tours/{id}", delete(gcft::delete_gcft))
            .route("/gcft/tours/{gcft_id}/snaps", post(gcft::create_gcft_snap))
            .route("/gcft/tours/{gcft_id}/snaps", get(gcft::list_gcft_snaps))
            .route("/gcft/snaps/{id}", get(gcft::get_gcft_snap))
            .route("/gcft/snaps/{id}", patch(gcft::update_gcft_snap))
            .route("/gcft/snaps/{id}", delete(gcft::delete_gcft_snap))
            .with_state(state);

        Some(PluginRoutes { router })
    }

    fn openapi_schema(&self) -> Option<OpenApi> {
        let mut schema = <ga4::Ga4ApiDoc as OpenApiTrait>::openapi();

        for extra in [
            <gsc::GscApiDoc as OpenApiTrait>::openapi(),
            <gcft::GcftApiDoc as OpenApiTrait>::openapi(),
        ] {
            for (path, path_item) in extra.paths.paths {
                schema.paths.paths.insert(path, path_item);
            }
            if let Some(components) = extra.components {
                let base = schema
                    .components
                    .get_or_insert_with(|| utoipa::openapi::ComponentsBuilder::new().build());
                for (name, component) in components.schemas {
                    base.schemas.insert(name, component);
                }
            }
            if let Some(tags) = extra.tags {
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
    async fn test_analytics_plugin_name() {
        let analytics_plugin = AnalyticsPlugin::new();
        assert_eq!(analytics_plugin.name(), "analytics");
    }
}
