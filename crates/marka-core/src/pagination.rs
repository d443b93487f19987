//! Pagination primitives shared by all list endpoints

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Common pagination query parameters
#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
pub struct PageParams {
    /// Page number, starting at 1
    pub page: Option<u64>,
    /// Number of items per page (1-100)
    pub size: Option<u64>,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: Some(1),
            size: Some(20),
        }
    }
}

impl PageParams {
    /// Clamp parameters into their valid ranges and return `(page, size)`
    pub fn normalize(&self) -> (u64, u64) {
        let page = self.page.unwrap_or(1).max(1);
        let size = self.size.unwrap_or(20).clamp(1, 100);
        (page, size)
    }

    /// Zero-based row offset for the normalized page
    pub fn offset(&self) -> u64 {
        let (page, size) = self.normalize();
        (page - 1) * size
    }
}

/// Standard paginated response envelope
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Paginated<T> {
    /// Page number that was returned
    pub page: u64,
    /// Page size that was applied
    pub size: u64,
    /// Total number of matching items across all pages
    pub total: u64,
    /// Items on this page
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn new(page: u64, size: u64, total: u64, results: Vec<T>) -> Self {
        Self {
            page,
            size,
            total,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_defaults() {
        let params = PageParams {
            page: None,
            size: None,
        };
        assert_eq!(params.normalize(), (1, 20));
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_normalize_clamps_out_of_range() {
        let params = PageParams {
            page: Some(0),
            size: Some(500),
        };
        assert_eq!(params.normalize(), (1, 100));

        let params = PageParams {
            page: Some(3),
            size: Some(0),
        };
        assert_eq!(params.normalize(), (3, 1));
    }

    #[test]
    fn test_offset() {
        let params = PageParams {
            page: Some(4),
            size: Some(25),
        };
        assert_eq!(params.offset(), 75);
    }
}
