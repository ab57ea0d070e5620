//! Page-based listing: query parameters and the server's pagination block.

use serde::{Deserialize, Serialize};

/// Page size used by every list view.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Query parameters for paginated list endpoints.
///
/// `search` is only sent when it holds a non-blank term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl ListQuery {
    /// Query for `page` (1-based, clamped to at least 1) with the default limit.
    pub fn page(page: u32) -> Self {
        Self {
            page: page.max(1),
            limit: DEFAULT_PAGE_LIMIT,
            search: None,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Attach a search term. Blank terms are dropped.
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        let trimmed = term.trim();
        self.search = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::page(1)
    }
}

/// Pagination block returned alongside list results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_records: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    /// 1-based inclusive range of records shown on `current_page`, as in
    /// "showing 11 to 20 of 23". Returns `None` when there are no records.
    pub fn shown_range(&self, limit: u32) -> Option<(u64, u64)> {
        if self.total_records == 0 || limit == 0 {
            return None;
        }
        let page = u64::from(self.current_page.max(1));
        let limit = u64::from(limit);
        let first = (page - 1) * limit + 1;
        if first > self.total_records {
            return None;
        }
        let last = (page * limit).min(self.total_records);
        Some((first, last))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
