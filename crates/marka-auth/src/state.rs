use std::sync::Arc;

use marka_core::AuditLogger;
use sea_orm::DatabaseConnection;

use crate::access::AccessControl;
use crate::apikey_service::ApiKeyService;
use crate::user_service::UserService;

/// Application state bundling the authentication services for axum handlers
#[derive(Clone)]
pub struct AuthState {
    pub db: Arc<DatabaseConnection>,
    pub user_service: Arc<UserService>,
    pub api_key_service: Arc<ApiKeyService>,
    pub access_control: Arc<AccessControl>,
    pub audit_service: Arc<dyn AuditLogger>,
}

impl AuthState {
    pub fn new(db: Arc<DatabaseConnection>, audit_service: Arc<dyn AuditLogger>) -> Self {
        let user_service = Arc::new(UserService::new(db.clone()));
        let api_key_service = Arc::new(ApiKeyService::new(db.clone()));
        let access_control = Arc::new(AccessControl::new(db.clone()));
        Self {
            db,
            user_service,
            api_key_service,
            access_control,
            audit_service,
        }
    }
}
