//! Audit event payloads for tracking link operations

use marka_core::{impl_audit_operation, AuditContext};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct TrackingLinkCreatedAudit {
    pub context: AuditContext,
    pub link_id: Uuid,
    pub url: String,
    pub client_id: Option<Uuid>,
}
impl_audit_operation!(TrackingLinkCreatedAudit, "TRACKING_LINK_CREATED");

#[derive(Debug, Clone, Serialize)]
pub struct TrackingLinkUpdatedAudit {
    pub context: AuditContext,
    pub link_id: Uuid,
    pub url: String,
}
impl_audit_operation!(TrackingLinkUpdatedAudit, "TRACKING_LINK_UPDATED");

#[derive(Debug, Clone, Serialize)]
pub struct TrackingLinkDeletedAudit {
    pub context: AuditContext,
    pub link_id: Uuid,
    pub url: String,
}
impl_audit_operation!(TrackingLinkDeletedAudit, "TRACKING_LINK_DELETED");
