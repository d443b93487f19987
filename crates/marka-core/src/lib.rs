//! Core utilities and types shared across all Marka crates

pub mod audit;
pub mod error;
pub mod error_builder;
pub mod pagination;
pub mod plugin;
pub mod problemdetails;
pub mod types;
mod request_metadata;

pub use problemdetails::ProblemDetails;

// Re-export commonly used types
pub use audit::*;
pub use error::*;
pub use error_builder::*;
pub use pagination::*;
pub use types::*;

// Re-export external dependencies
pub use anyhow;
pub use async_trait;
pub use chrono;
pub use serde;
pub use serde_json;
pub use thiserror;
pub use tokio;
pub use tracing;
pub use uuid;
pub use request_metadata::RequestMetadata;
