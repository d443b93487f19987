pub mod users;
pub mod clients;
pub mod websites;
pub mod user_clients;
pub mod client_websites;
pub mod tracking_links;
pub mod website_maps;
pub mod website_pages;

// Google Analytics 4 entities
pub mod ga4_properties;
pub mod ga4_streams;

// Google Search Console entities
pub mod gsc_properties;
pub mod gsc_metrics;

// Flythrough tour entities
pub mod gcfts;
pub mod gcft_snaps;

pub mod api_keys;
pub mod audit_logs;

pub mod prelude;
