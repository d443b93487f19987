//! Tracking link management for Marka
//!
//! Tracking links are full campaign URLs decomposed server-side into
//! scheme, domain, destination, path, and UTM parameters. The SHA-256
//! hash of the URL deduplicates links across the system.

pub mod audit;
pub mod handlers;
pub mod parser;
pub mod plugin;
pub mod service;

pub use audit::*;
pub use handlers::{TrackingLinkApiDoc, TrackingLinkState};
pub use parser::{parse_tracking_url, ParsedUrl, URL_MAX_LEN, UTM_VALUE_MAX_LEN};
pub use plugin::TrackingLinksPlugin;
pub use service::{
    CreateTrackingLinkRequest, TrackingLinkFilter, TrackingLinkResponse, TrackingLinkService,
    UpdateTrackingLinkRequest,
};
