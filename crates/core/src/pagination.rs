//! Page-number pagination for owner listings.

use serde::Serialize;

// ---------------------------------------------------------------------------
// Page sizes
// ---------------------------------------------------------------------------

/// Fixed page size for an entry's feedback list.
pub const FEEDBACK_PER_PAGE: i64 = 10;

/// Clamp a user-provided, 1-based page number to at least 1.
pub fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(1).max(1)
}

/// Row offset of the first item on `page`.
pub fn offset_for(page: i64, per_page: i64) -> i64 {
    (page.max(1) - 1).saturating_mul(per_page)
}

/// Number of the last page. An empty result still has one (empty) page.
pub fn last_page(total: i64, per_page: i64) -> i64 {
    if total <= 0 || per_page <= 0 {
        1
    } else {
        (total + per_page - 1) / per_page
    }
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// One page of a listing plus the numbers a client needs to page through it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: i64,
    pub last_page: i64,
    pub per_page: i64,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, current_page: i64, per_page: i64, total: i64) -> Self {
        Self {
            items,
            current_page,
            last_page: last_page(total, per_page),
            per_page,
            total,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            current_page: self.current_page,
            last_page: self.last_page,
            per_page: self.per_page,
            total: self.total,
        }
    }
}
