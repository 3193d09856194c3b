//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Page-number pagination (`?page=`). Clamped with
/// `formdesk_core::pagination::clamp_page`.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
}

/// Query parameters for the owner's entry list (`?search=&sort=&page=`).
///
/// `sort` is kept as a raw string so unknown values fall back to the default
/// order instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct EntryListParams {
    pub search: Option<String>,
    pub sort: Option<String>,
    pub page: Option<i64>,
}
