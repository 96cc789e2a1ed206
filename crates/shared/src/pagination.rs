//! Offset pagination utilities.

use serde::{Deserialize, Serialize};

/// Default page size when the caller does not specify one.
pub const DEFAULT_PER_PAGE: i32 = 50;

/// Hard cap on page size.
pub const MAX_PER_PAGE: i32 = 100;

/// Query-string pagination parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i32>,
    pub per_page: Option<i32>,
}

impl PageQuery {
    /// Effective page number, 1-based.
    pub fn page(&self) -> i32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Effective page size, clamped to [1, MAX_PER_PAGE].
    pub fn per_page(&self) -> i32 {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE)
    }

    /// Row offset for the effective page.
    pub fn offset(&self) -> i64 {
        ((self.page() - 1) * self.per_page()) as i64
    }
}

/// Pagination envelope returned alongside listed rows.
#[derive(Debug, Clone, Serialize)]
pub struct PageInfo {
    pub page: i32,
    pub per_page: i32,
    pub total: i64,
    pub total_pages: i32,
}

impl PageInfo {
    /// Builds page info from the effective query and a total row count.
    pub fn new(query: &PageQuery, total: i64) -> Self {
        let per_page = query.per_page();
        let total_pages = ((total as f64) / (per_page as f64)).ceil() as i32;
        Self {
            page: query.page(),
            per_page,
            total,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let q = PageQuery::default();
        assert_eq!(q.page(), 1);
        assert_eq!(q.per_page(), DEFAULT_PER_PAGE);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn test_clamping() {
        let q = PageQuery {
            page: Some(0),
            per_page: Some(1000),
        };
        assert_eq!(q.page(), 1);
        assert_eq!(q.per_page(), MAX_PER_PAGE);
    }

    #[test]
    fn test_offset() {
        let q = PageQuery {
            page: Some(3),
            per_page: Some(20),
        };
        assert_eq!(q.offset(), 40);
    }

    #[test]
    fn test_page_info() {
        let q = PageQuery {
            page: Some(2),
            per_page: Some(10),
        };
        let info = PageInfo::new(&q, 25);
        assert_eq!(info.total_pages, 3);
        assert_eq!(info.total, 25);
    }
}
