//! Audit event payloads for user and API key operations

use marka_core::{impl_audit_operation, AuditContext, AuditOperation};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct UserCreatedAudit {
    pub context: AuditContext,
    pub target_user_id: Uuid,
    pub username: String,
    pub assigned_roles: Vec<String>,
}
impl_audit_operation!(UserCreatedAudit, "USER_CREATED");

#[derive(Debug, Clone, Serialize)]
pub struct UserUpdatedAudit {
    pub context: AuditContext,
    pub target_user_id: Uuid,
    pub username: String,
    pub new_email: Option<String>,
    pub new_username: Option<String>,
}
impl_audit_operation!(UserUpdatedAudit, "USER_UPDATED");

#[derive(Debug, Clone, Serialize)]
pub struct UserDeletedAudit {
    pub context: AuditContext,
    pub target_user_id: Uuid,
    pub username: String,
    pub email: String,
}
impl_audit_operation!(UserDeletedAudit, "USER_DELETED");

#[derive(Debug, Clone, Serialize)]
pub struct UserActivationAudit {
    pub context: AuditContext,
    pub target_user_id: Uuid,
    pub username: String,
    pub is_active: bool,
}

impl AuditOperation for UserActivationAudit {
    fn operation_type(&self) -> String {
        if self.is_active {
            "USER_ACTIVATED".to_string()
        } else {
            "USER_DEACTIVATED".to_string()
        }
    }

    fn user_id(&self) -> Option<Uuid> {
        self.context.user_id
    }

    fn ip_address(&self) -> Option<String> {
        self.context.ip_address.clone()
    }

    fn user_agent(&self) -> &str {
        &self.context.user_agent
    }

    fn serialize(&self) -> anyhow::Result<String> {
        serde_json::to_string(self).map_err(anyhow::Error::from)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleAssignedAudit {
    pub context: AuditContext,
    pub target_user_id: Uuid,
    pub username: String,
    pub role: String,
}
impl_audit_operation!(RoleAssignedAudit, "ROLE_ASSIGNED");

#[derive(Debug, Clone, Serialize)]
pub struct RoleRemovedAudit {
    pub context: AuditContext,
    pub target_user_id: Uuid,
    pub username: String,
    pub role: String,
}
impl_audit_operation!(RoleRemovedAudit, "ROLE_REMOVED");

#[derive(Debug, Clone, Serialize)]
pub struct ScopeGrantedAudit {
    pub context: AuditContext,
    pub target_user_id: Uuid,
    pub scope: String,
}
impl_audit_operation!(ScopeGrantedAudit, "SCOPE_GRANTED");

#[derive(Debug, Clone, Serialize)]
pub struct ScopeRevokedAudit {
    pub context: AuditContext,
    pub target_user_id: Uuid,
    pub scope: String,
}
impl_audit_operation!(ScopeRevokedAudit, "SCOPE_REVOKED");

#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyCreatedAudit {
    pub context: AuditContext,
    pub key_id: Uuid,
    pub key_name: String,
    pub role: Option<String>,
}
impl_audit_operation!(ApiKeyCreatedAudit, "API_KEY_CREATED");

#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyUpdatedAudit {
    pub context: AuditContext,
    pub key_id: Uuid,
    pub key_name: String,
}
impl_audit_operation!(ApiKeyUpdatedAudit, "API_KEY_UPDATED");

#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyRevokedAudit {
    pub context: AuditContext,
    pub key_id: Uuid,
    pub key_name: String,
}
impl_audit_operation!(ApiKeyRevokedAudit, "API_KEY_REVOKED");
