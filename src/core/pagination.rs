//! Page descriptors for list responses

use crate::core::query::PageRequest;
use serde::{Deserialize, Serialize};

/// Which records the total of a paginated response counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TotalScope {
    /// Records matching the request's filters
    #[default]
    Filtered,
    /// The whole collection, regardless of filters
    Collection,
}

/// A neighbouring page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageLink {
    pub page: usize,
    pub limit: usize,
}

/// `next`/`prev` descriptors, each present only when that page exists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageLink>,
}

impl Pagination {
    /// Build descriptors for `page` given `total` records
    pub fn compute(page: &PageRequest, total: usize) -> Self {
        let next = (page.end_index() < total).then(|| PageLink {
            page: page.page + 1,
            limit: page.limit,
        });
        let prev = (page.skip() > 0).then(|| PageLink {
            page: page.page - 1,
            limit: page.limit,
        });
        Self { next, prev }
    }
}
