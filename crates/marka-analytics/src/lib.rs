//! Google Analytics 4, Search Console, and flythrough tour management
//!
//! Stores GA4 properties and data streams, Search Console properties and
//! their reported metrics, and guided content flythrough tours with their
//! snapshots. External Google APIs are never called.

pub mod audit;
pub mod ga4_service;
pub mod gcft_service;
pub mod gsc_service;
pub mod handlers;
pub mod plugin;

pub use audit::*;
pub use ga4_service::{
    CreateGa4PropertyRequest, CreateGa4StreamRequest, Ga4PropertyResponse, Ga4Service,
    Ga4StreamResponse, UpdateGa4PropertyRequest, UpdateGa4StreamRequest,
};
pub use gcft_service::{
    CreateGcftRequest, CreateGcftSnapRequest, GcftResponse, GcftService, GcftSnapResponse,
    UpdateGcftRequest, UpdateGcftSnapRequest,
};
pub use gsc_service::{
    CreateGscMetricRequest, CreateGscPropertyRequest, GscMetricFilter, GscMetricResponse,
    GscPropertyResponse, GscService, MetricType, UpdateGscPropertyRequest,
};
pub use handlers::AnalyticsState;
pub use plugin::AnalyticsPlugin;
