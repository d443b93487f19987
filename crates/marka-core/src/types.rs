//! Custom types for common data structures

use chrono::{DateTime as ChronoDateTime, Utc};

/// Database DateTime type used across all Marka crates
///
/// This is the canonical datetime type for TIMESTAMPTZ columns.
pub type DbDateTime = ChronoDateTime<Utc>;

/// Standard UTC DateTime type used across all Marka crates
///
/// Serializes as ISO 8601 with a 'Z' suffix in API responses. When used with
/// utoipa, annotate fields with:
/// ```rust,ignore
/// #[schema(value_type = String, format = DateTime)]
/// pub created_at: UtcDateTime,
/// ```
pub type UtcDateTime = ChronoDateTime<Utc>;
