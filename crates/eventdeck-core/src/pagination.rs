//! Page arithmetic for merged event listings.

use serde::{Deserialize, Serialize};

/// Page size used when pagination is disabled ("everything on one page").
pub const MAX_EVENTS_PER_PAGE: usize = 999;

/// Returns the effective page size.
pub fn effective_per_page(per_page: usize, disable_pagination: bool) -> usize {
    if disable_pagination {
        MAX_EVENTS_PER_PAGE
    } else {
        per_page.max(1)
    }
}

/// Returns how many items precede `requested_page`.
pub fn skip_for(requested_page: usize, per_page: usize) -> usize {
    if requested_page > 1 {
        (requested_page - 1).saturating_mul(per_page)
    } else {
        0
    }
}

/// Navigation state for a paginated listing. Derived per request, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Current page, 1-based.
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub max_page: usize,
}

impl Pagination {
    /// Computes the pagination state. Pages below 1 are treated as page 1.
    pub fn new(total_items: usize, per_page: usize, requested_page: usize) -> Self {
        let per_page = per_page.max(1);
        Self {
            page: requested_page.max(1),
            per_page,
            total_items,
            max_page: total_items.div_ceil(per_page),
        }
    }

    /// Items before the current page.
    pub fn skip(&self) -> usize {
        skip_for(self.page, self.per_page)
    }

    /// Returns true if there is a page after the current one.
    pub fn has_next(&self) -> bool {
        self.page < self.max_page
    }

    /// Returns true if there is a page before the current one.
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Returns the current page's items. Past the last page this is empty.
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        items
            .iter()
            .skip(self.skip())
            .take(self.per_page)
            .cloned()
            .collect()
    }
}

/// Returns the items of `requested_page`.
pub fn slice<T: Clone>(items: &[T], requested_page: usize, per_page: usize) -> Vec<T> {
    Pagination::new(items.len(), per_page, requested_page).slice(items)
}
