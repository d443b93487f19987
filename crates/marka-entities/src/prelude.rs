pub use super::api_keys::Entity as ApiKeys;
pub use super::audit_logs::Entity as AuditLogs;
pub use super::client_websites::Entity as ClientWebsites;
pub use super::clients::Entity as Clients;
pub use super::ga4_properties::Entity as Ga4Properties;
pub use super::ga4_streams::Entity as Ga4Streams;
pub use super::gcft_snaps::Entity as GcftSnaps;
pub use super::gcfts::Entity as Gcfts;
pub use super::gsc_metrics::Entity as GscMetrics;
pub use super::gsc_properties::Entity as GscProperties;
pub use super::tracking_links::Entity as TrackingLinks;
pub use super::user_clients::Entity as UserClients;
pub use super::users::Entity as Users;
pub use super::website_maps::Entity as WebsiteMaps;
pub use super::website_pages::Entity as WebsitePages;
pub use super::websites::Entity as Websites;
