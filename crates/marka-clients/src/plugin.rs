//! Clients plugin for the Marka plugin system
//!
//! Provides client (tenant) management together with the user and
//! website association endpoints.

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

use crate::handlers::{self, ClientApiDoc, ClientState};
use crate::service::ClientService;

pub struct ClientsPlugin;

impl ClientsPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ClientsPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkaPlugin for ClientsPlugin {
    fn name(&self) -> &'static str {
        "clients"
    }

    fn register_services<'a>(
        &'a self,
        context: &'a ServiceRegistrationContext,
    ) -> Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send + 'a>> {
        Box::pin(async move {
            let db = context.require_service::<sea_orm::DatabaseConnection>();

            let client_service = Arc::new(ClientService::new(db));
            context.register_service(client_service);

            tracing::debug!("Clients plugin services registered successfully");
            Ok(())
        })
    }

    fn configure_routes(&self, context: &PluginContext) -> Option<PluginRoutes> {
        let state = Arc::new(ClientState {
            client_service: context.require_service::<ClientService>(),
            access_control: context.require_service::<AccessControl>(),
            audit_service: context.require_service::<dyn AuditLogger>(),
        });

        let router: Router = Router::new()
            .route("/clients", post(handlers::create_client))
            .route("/clients", get(handlers::list_clients))
            .route("/clients/{id}", get(handlers::get_client))
            .route("/clients/{id}", patch(handlers::update_client))
            .route("/clients/{id}", delete(handlers::delete_client))
            .route("/clients/{id}/users", get(handlers::list_client_users))
            .route("/clients/{id}/users", post(handlers::assign_client_user))
            .route(
                "/clients/{id}/users/{user_id}",
                delete(handlers::remove_client_user),
            )
            .route(
                "/clients/{id}/websites",
                get(handlers::list_client_websites),
            )
            .route(
                "/clients/{id}/websites",
                post(handlers::assign_client_website),
            )
            .route(
                "/clients/{id}/websites/{website_id}",
                delete(handlers::remove_client_website),
            )
            .with_state(state);

        Some(PluginRoutes { router })
    }

    fn openapi_schema(&self) -> Option<OpenApi> {
        Some(<ClientApiDoc as OpenApiTrait>::openapi())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clients_plugin_name() {
        let clients_plugin = ClientsPlugin::new();
        assert_eq!(clients_plugin.name(), "clients");
    }
}
