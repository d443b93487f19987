//! Audit event payloads for analytics property operations

use marka_core::{impl_audit_operation, AuditContext};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct Ga4PropertyCreatedAudit {
    pub context: AuditContext,
    pub ga4_id: Uuid,
    pub title: String,
    pub measurement_id: String,
}
impl_audit_operation!(Ga4PropertyCreatedAudit, "GA4_PROPERTY_CREATED");

#[derive(Debug, Clone, Serialize)]
pub struct Ga4PropertyUpdatedAudit {
    pub context: AuditContext,
    pub ga4_id: Uuid,
    pub title: String,
}
impl_audit_operation!(Ga4PropertyUpdatedAudit, "GA4_PROPERTY_UPDATED");

#[derive(Debug, Clone, Serialize)]
pub struct Ga4PropertyDeletedAudit {
    pub context: AuditContext,
    pub ga4_id: Uuid,
    pub title: String,
}
impl_audit_operation!(Ga4PropertyDeletedAudit, "GA4_PROPERTY_DELETED");

#[derive(Debug, Clone, Serialize)]
pub struct Ga4StreamCreatedAudit {
    pub context: AuditContext,
    pub stream_id: Uuid,
    pub ga4_id: Uuid,
    pub title: String,
}
impl_audit_operation!(Ga4StreamCreatedAudit, "GA4_STREAM_CREATED");

#[derive(Debug, Clone, Serialize)]
pub struct Ga4StreamUpdatedAudit {
    pub context: AuditContext,
    pub stream_id: Uuid,
    pub title: String,
}
impl_audit_operation!(Ga4StreamUpdatedAudit, "GA4_STREAM_UPDATED");

#[derive(Debug, Clone, Serialize)]
pub struct Ga4StreamDeletedAudit {
    pub context: AuditContext,
    pub stream_id: Uuid,
    pub title: String,
}
impl_audit_operation!(Ga4StreamDeletedAudit, "GA4_STREAM_DELETED");

#[derive(Debug, Clone, Serialize)]
pub struct GcftCreatedAudit {
    pub context: AuditContext,
    pub gcft_id: Uuid,
    pub group_name: String,
    pub client_id: Uuid,
}
impl_audit_operation!(GcftCreatedAudit, "GCFT_CREATED");

#[derive(Debug, Clone, Serialize)]
pub struct GcftUpdatedAudit {
    pub context: AuditContext,
    pub gcft_id: Uuid,
    pub group_name: String,
}
impl_audit_operation!(GcftUpdatedAudit, "GCFT_UPDATED");

#[derive(Debug, Clone, Serialize)]
pub struct GcftDeletedAudit {
    pub context: AuditContext,
    pub gcft_id: Uuid,
    pub group_name: String,
}
impl_audit_operation!(GcftDeletedAudit, "GCFT_DELETED");

#[derive(Debug, Clone, Serialize)]
pub struct GcftSnapCreatedAudit {
    pub context: AuditContext,
    pub snap_id: Uuid,
    pub gcft_id: Uuid,
    pub snap_name: String,
}
impl_audit_operation!(GcftSnapCreatedAudit, "GCFT_SNAP_CREATED");

#[derive(Debug, Clone, Serialize)]
pub struct GcftSnapUpdatedAudit {
    pub context: AuditContext,
    pub snap_id: Uuid,
    pub snap_name: String,
}
impl_audit_operation!(GcftSnapUpdatedAudit, "GCFT_SNAP_UPDATED");

#[derive(Debug, Clone, Serialize)]
pub struct GcftSnapDeletedAudit {
    pub context: AuditContext,
    pub snap_id: Uuid,
    pub gcft_id: Uuid,
}
impl_audit_operation!(GcftSnapDeletedAudit, "GCFT_SNAP_DELETED");

#[derive(Debug, Clone, Serialize)]
pub struct GscPropertyCreatedAudit {
    pub context: AuditContext,
    pub gsc_id: Uuid,
    pub title: String,
}
impl_audit_operation!(GscPropertyCreatedAudit, "GSC_PROPERTY_CREATED");

#[derive(Debug, Clone, Serialize)]
pub struct GscPropertyUpdatedAudit {
    pub context: AuditContext,
    pub gsc_id: Uuid,
    pub title: String,
}
impl_audit_operation!(GscPropertyUpdatedAudit, "GSC_PROPERTY_UPDATED");

#[derive(Debug, Clone, Serialize)]
pub struct GscPropertyDeletedAudit {
    pub context: AuditContext,
    pub gsc_id: Uuid,
    pub title: String,
}
impl_audit_operation!(GscPropertyDeletedAudit, "GSC_PROPERTY_DELETED");

#[derive(Debug, Clone, Serialize)]
pub struct GscMetricCreatedAudit {
    pub context: AuditContext,
    pub metric_id: Uuid,
    pub gsc_id: Uuid,
    pub metric_type: String,
}
impl_audit_operation!(GscMetricCreatedAudit, "GSC_METRIC_CREATED");

#[derive(Debug, Clone, Serialize)]
pub struct GscMetricDeletedAudit {
    pub context: AuditContext,
    pub metric_id: Uuid,
    pub gsc_id: Uuid,
}
impl_audit_operation!(GscMetricDeletedAudit, "GSC_METRIC_DELETED");
