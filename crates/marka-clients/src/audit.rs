//! Audit event payloads for client operations

use marka_core::{impl_audit_operation, AuditContext};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct ClientCreatedAudit {
    pub context: AuditContext,
    pub client_id: Uuid,
    pub title: String,
    pub slug: String,
}
impl_audit_operation!(ClientCreatedAudit, "CLIENT_CREATED");

#[derive(Debug, Clone, Serialize)]
pub struct ClientUpdatedAudit {
    pub context: AuditContext,
    pub client_id: Uuid,
    pub title: String,
}
impl_audit_operation!(ClientUpdatedAudit, "CLIENT_UPDATED");

#[derive(Debug, Clone, Serialize)]
pub struct ClientDeactivatedAudit {
    pub context: AuditContext,
    pub client_id: Uuid,
    pub title: String,
}
impl_audit_operation!(ClientDeactivatedAudit, "CLIENT_DEACTIVATED");

#[derive(Debug, Clone, Serialize)]
pub struct ClientDeletedAudit {
    pub context: AuditContext,
    pub client_id: Uuid,
    pub title: String,
}
impl_audit_operation!(ClientDeletedAudit, "CLIENT_DELETED");

#[derive(Debug, Clone, Serialize)]
pub struct ClientUserAssignedAudit {
    pub context: AuditContext,
    pub client_id: Uuid,
    pub target_user_id: Uuid,
}
impl_audit_operation!(ClientUserAssignedAudit, "CLIENT_USER_ASSIGNED");

#[derive(Debug, Clone, Serialize)]
pub struct ClientUserRemovedAudit {
    pub context: AuditContext,
    pub client_id: Uuid,
    pub target_user_id: Uuid,
}
impl_audit_operation!(ClientUserRemovedAudit, "CLIENT_USER_REMOVED");

#[derive(Debug, Clone, Serialize)]
pub struct ClientWebsiteAssignedAudit {
    pub context: AuditContext,
    pub client_id: Uuid,
    pub website_id: Uuid,
}
impl_audit_operation!(ClientWebsiteAssignedAudit, "CLIENT_WEBSITE_ASSIGNED");

#[derive(Debug, Clone, Serialize)]
pub struct ClientWebsiteRemovedAudit {
    pub context: AuditContext,
    pub client_id: Uuid,
    pub website_id: Uuid,
}
impl_audit_operation!(ClientWebsiteRemovedAudit, "CLIENT_WEBSITE_REMOVED");
