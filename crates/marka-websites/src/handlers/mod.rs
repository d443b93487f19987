pub mod pages;
pub mod sitemaps;
pub mod websites;

use std::sync::Arc;

use marka_auth::AccessControl;
use marka_core::AuditLogger;

use crate::page_service::PageService;
use crate::sitemap_service::SitemapService;
use crate::website_service::WebsiteService;

pub struct WebsiteState {
    pub website_service: Arc<WebsiteService>,
    pub sitemap_service: Arc<SitemapService>,
    pub page_service: Arc<PageService>,
    pub access_control: Arc<AccessControl>,
    pub audit_service: Arc<dyn AuditLogger>,
}
