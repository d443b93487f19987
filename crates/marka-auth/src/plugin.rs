//! Auth plugin for the Marka plugin system
//!
//! Provides user management, API key management, the bearer-token
//! authentication middleware, and the database-backed audit logger.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::routing::{delete, get, patch, post};
use axum::Router;
use marka_core::plugin::{
    MarkaPlugin, PluginContext, PluginError, PluginMiddlewareCollection, PluginRoutes,
    ServiceRegistrationContext,
};
use marka_core::AuditLogger;
use utoipa::openapi::OpenApi;
use utoipa::OpenApi as OpenApiTrait;

use crate::access::AccessControl;
use crate::apikey_service::ApiKeyService;
use crate::audit_logger::DbAuditLogger;
use crate::handlers::{api_keys, users};
use crate::middleware::auth_middleware;
use crate::state::AuthState;
use crate::user_service::UserService;

pub struct AuthPlugin;

impl AuthPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AuthPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkaPlugin for AuthPlugin {
    fn name(&self) -> &'static str {
        "auth"
    }

    fn register_services<'a>(
        &'a self,
        context: &'a ServiceRegistrationContext,
    ) -> Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send + 'a>> {
        Box::pin(async move {
            let db = context.require_service::<sea_orm::DatabaseConnection>();

            let audit_service: Arc<dyn AuditLogger> = Arc::new(DbAuditLogger::new(db.clone()));
            context.register_service(audit_service.clone());

            let user_service = Arc::new(UserService::new(db.clone()));
            context.register_service(user_service);

            let api_key_service = Arc::new(ApiKeyService::new(db.clone()));
            context.register_service(api_key_service);

            let access_control = Arc::new(AccessControl::new(db.clone()));
            context.register_service(access_control);

            let auth_state = Arc::new(AuthState::new(db, audit_service));
            context.register_service(auth_state);

            tracing::debug!("Auth plugin services registered successfully");
            Ok(())
        })
    }

    fn configure_routes(&self, context: &PluginContext) -> Option<PluginRoutes> {
        let auth_state = context.require_service::<AuthState>();

        let router: Router = Router::new()
            .route("/users", get(users::list_users))
            .route("/users/me", get(users::get_current_user))
            .route("/users/{id}", get(users::get_user))
            .route("/users/{id}", patch(users::update_user))
            .route("/users/{id}", delete(users::delete_user))
            .route("/users/{id}/activate", post(users::activate_user))
            .route("/users/{id}/deactivate", post(users::deactivate_user))
            .route("/users/{id}/privileges", post(users::grant_privilege))
            .route("/users/{id}/privileges", delete(users::revoke_privilege))
            .route("/api-keys", post(api_keys::create_api_key))
            .route("/api-keys", get(api_keys::list_api_keys))
            .route("/api-keys/{id}", get(api_keys::get_api_key))
            .route("/api-keys/{id}", patch(api_keys::update_api_key))
            .route("/api-keys/{id}", delete(api_keys::delete_api_key))
            .with_state(auth_state);

        Some(PluginRoutes { router })
    }

    fn openapi_schema(&self) -> Option<OpenApi> {
        let mut schema = <users::UserApiDoc as OpenApiTrait>::openapi();
        let api_key_schema = <api_keys::ApiKeyApiDoc as OpenApiTrait>::openapi();

        for (path, path_item) in api_key_schema.paths.paths {
            schema.paths.paths.insert(path, path_item);
        }

        if let Some(api_key_components) = api_key_schema.components {
            let components = schema
                .components
                .get_or_insert_with(|| utoipa::openapi::ComponentsBuilder::new().build());
            for (name, component) in api_key_components.schemas {
                components.schemas.insert(name, component);
            }
        }

        if let Some(api_key_tags) = api_key_schema.tags {
            schema.tags.get_or_insert_with(Vec::new).extend(api_key_tags);
        }

        Some(schema)
    }

    fn configure_middleware(&self, context: &PluginContext) -> Option<PluginMiddlewareCollection> {
        let auth_state = context.require_service::<AuthState>();

        let mut middleware_collection = PluginMiddlewareCollection::new();
        middleware_collection.add_auth_middleware("auth", self.name(), move |req, next| {
            let state = auth_state.clone();
            auth_middleware(state, req, next)
        });

        Some(middleware_collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_auth_plugin_name() {
        let auth_plugin = AuthPlugin::new();
        assert_eq!(auth_plugin.name(), "auth");
    }

    #[tokio::test]
    async fn test_auth_plugin_default() {
        let auth_plugin = AuthPlugin;
        assert_eq!(auth_plugin.name(), "auth");
    }
}
