//! Audit event payloads for website, sitemap, and page operations

use marka_core::{impl_audit_operation, AuditContext};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct WebsiteCreatedAudit {
    pub context: AuditContext,
    pub website_id: Uuid,
    pub domain: String,
}
impl_audit_operation!(WebsiteCreatedAudit, "WEBSITE_CREATED");

#[derive(Debug, Clone, Serialize)]
pub struct WebsiteUpdatedAudit {
    pub context: AuditContext,
    pub website_id: Uuid,
    pub domain: String,
}
impl_audit_operation!(WebsiteUpdatedAudit, "WEBSITE_UPDATED");

#[derive(Debug, Clone, Serialize)]
pub struct WebsiteDeletedAudit {
    pub context: AuditContext,
    pub website_id: Uuid,
    pub domain: String,
}
impl_audit_operation!(WebsiteDeletedAudit, "WEBSITE_DELETED");

#[derive(Debug, Clone, Serialize)]
pub struct SitemapCreatedAudit {
    pub context: AuditContext,
    pub sitemap_id: Uuid,
    pub website_id: Uuid,
    pub url: String,
}
impl_audit_operation!(SitemapCreatedAudit, "SITEMAP_CREATED");

#[derive(Debug, Clone, Serialize)]
pub struct SitemapUpdatedAudit {
    pub context: AuditContext,
    pub sitemap_id: Uuid,
    pub website_id: Uuid,
}
impl_audit_operation!(SitemapUpdatedAudit, "SITEMAP_UPDATED");

#[derive(Debug, Clone, Serialize)]
pub struct SitemapDeletedAudit {
    pub context: AuditContext,
    pub sitemap_id: Uuid,
    pub website_id: Uuid,
}
impl_audit_operation!(SitemapDeletedAudit, "SITEMAP_DELETED");

#[derive(Debug, Clone, Serialize)]
pub struct PageCreatedAudit {
    pub context: AuditContext,
    pub page_id: Uuid,
    pub website_id: Uuid,
    pub url: String,
}
impl_audit_operation!(PageCreatedAudit, "PAGE_CREATED");

#[derive(Debug, Clone, Serialize)]
pub struct PageUpdatedAudit {
    pub context: AuditContext,
    pub page_id: Uuid,
    pub website_id: Uuid,
}
impl_audit_operation!(PageUpdatedAudit, "PAGE_UPDATED");

#[derive(Debug, Clone, Serialize)]
pub struct PageDeletedAudit {
    pub context: AuditContext,
    pub page_id: Uuid,
    pub website_id: Uuid,
}
impl_audit_operation!(PageDeletedAudit, "PAGE_DELETED");
