//! Website, sitemap, and page management for Marka
//!
//! Websites are assigned to clients through `client_websites` and carry
//! sitemaps plus observed pages.

pub mod audit;
pub mod handlers;
pub mod page_service;
pub mod plugin;
pub mod sitemap_service;
pub mod website_service;

pub use audit::*;
pub use handlers::WebsiteState;
pub use page_service::{
    CreatePageRequest, PageResponse, PageService, UpdatePageRequest, PAGE_URL_MAX_LEN,
};
pub use plugin::WebsitesPlugin;
pub use sitemap_service::{
    CreateSitemapRequest, SitemapResponse, SitemapService, UpdateSitemapRequest,
    SITEMAP_URL_MAX_LEN,
};
pub use website_service::{
    validate_domain, CreateWebsiteRequest, UpdateWebsiteRequest, WebsiteResponse, WebsiteService,
    DOMAIN_MAX_LEN,
};
