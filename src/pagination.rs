//! This modules defines the common functionality for paging data.

use serde::{Deserialize, Serialize};

use crate::Error;

/// The config for pagination
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of items per page when not specified in a request.
    pub default_page_size: u64,
    /// The largest page size a client may ask for.
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

/// The `page` and `limit` query parameters as sent by the client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    /// The 1-based page number.
    pub page: Option<u64>,
    /// The number of items per page.
    pub limit: Option<u64>,
}

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page {
    /// The 1-based page number.
    pub page: u64,
    /// The number of items per page.
    pub limit: u64,
}

impl Page {
    /// Fill in missing values from `config` and check the values are in range.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidQuery] if `page` or `limit` is zero, or if
    /// `limit` is larger than the configured maximum.
    pub fn from_query(query: &PageQuery, config: &PaginationConfig) -> Result<Self, Error> {
        let page = query.page.unwrap_or(config.default_page);
        let limit = query.limit.unwrap_or(config.default_page_size);

        if page == 0 {
            return Err(Error::InvalidQuery("page must be at least 1".to_owned()));
        }

        if limit == 0 || limit > config.max_page_size {
            return Err(Error::InvalidQuery(format!(
                "limit must be between 1 and {}",
                config.max_page_size
            )));
        }

        Ok(Self { page, limit })
    }

    /// The number of rows to skip.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Pagination metadata returned alongside a page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// The 1-based page number.
    pub page: u64,
    /// The number of items per page.
    pub limit: u64,
    /// The number of items across all pages.
    pub total: u64,
    /// The number of pages needed to show every item.
    pub total_pages: u64,
}

impl PageInfo {
    /// Describe `page` of a collection with `total` items.
    pub fn new(page: Page, total: u64) -> Self {
        Self {
            page: page.page,
            limit: page.limit,
            total,
            total_pages: total.div_ceil(page.limit),
        }
    }
}

#[cfg(test)]
mod pagination_tests {
    use crate::Error;

    use super::{Page, PageInfo, PageQuery, PaginationConfig};

    #[test]
    fn missing_values_use_defaults() {
        let page = Page::from_query(&PageQuery::default(), &PaginationConfig::default());

        assert_eq!(page, Ok(Page { page: 1, limit: 20 }));
    }

    #[test]
    fn rejects_page_zero() {
        let query = PageQuery {
            page: Some(0),
            limit: None,
        };

        let page = Page::from_query(&query, &PaginationConfig::default());

        assert!(matches!(page, Err(Error::InvalidQuery(_))));
    }

    #[test]
    fn rejects_limit_above_maximum() {
        let query = PageQuery {
            page: None,
            limit: Some(101),
        };

        let page = Page::from_query(&query, &PaginationConfig::default());

        assert!(matches!(page, Err(Error::InvalidQuery(_))));
    }

    #[test]
    fn accepts_maximum_limit() {
        let query = PageQuery {
            page: Some(3),
            limit: Some(100),
        };

        let page = Page::from_query(&query, &PaginationConfig::default()).unwrap();

        assert_eq!(page.offset(), 200);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = Page { page: 1, limit: 20 };

        assert_eq!(PageInfo::new(page, 0).total_pages, 0);
        assert_eq!(PageInfo::new(page, 20).total_pages, 1);
        assert_eq!(PageInfo::new(page, 21).total_pages, 2);
    }
}
