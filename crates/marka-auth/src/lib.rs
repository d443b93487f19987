mod access;
mod acls;
mod apikey_service;
mod audit;
mod audit_logger;
pub mod context;
mod extractors;
pub mod handlers;
mod middleware;
mod permission_guard;
pub mod permissions;
mod plugin;
pub mod state;
mod user_service;

pub use access::{AccessControl, AccessTarget};
pub use apikey_service::{
    ApiKeyResponse, ApiKeyService, ApiKeyServiceError, CreateApiKeyRequest, CreateApiKeyResponse,
    UpdateApiKeyRequest, ValidatedApiKey, API_KEY_PREFIX,
};
pub use audit::*;
pub use audit_logger::{audit_or_warn, DbAuditLogger};
pub use context::*;
pub use extractors::{ExtractRequestMetadata, RequireAuth};
pub use middleware::{auth_middleware, bearer_token, validate_bearer_token, AuthError};
pub use permissions::*;
pub use plugin::AuthPlugin;
pub use state::AuthState;
pub use user_service::{
    CreateUserRequest, UpdateUserRequest, UserResponse, UserService,
};
