//! Entry (form) rules: field validation, slug generation and list sorting.

use rand::Rng;
use serde::Serialize;

use crate::error::CoreError;
use crate::validation::{char_len, FieldErrors};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum title length in characters.
pub const TITLE_MAX_LEN: usize = 255;

/// Number of random characters appended to every slug.
pub const SLUG_SUFFIX_LEN: usize = 6;

/// How many fresh slugs to try before giving up on a collision.
pub const SLUG_MAX_ATTEMPTS: usize = 5;

/// Fixed page size for the owner's entry list.
pub const ENTRIES_PER_PAGE: i64 = 15;

const SLUG_SUFFIX_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

// ---------------------------------------------------------------------------
// Slugs
// ---------------------------------------------------------------------------

/// Turn a title into a URL-safe slug base.
///
/// Lowercases, replaces every run of non-alphanumeric characters with a single
/// hyphen and trims hyphens from both ends.
pub fn slugify(title: &str) -> String {
    let mut result = String::with_capacity(title.len());
    let mut prev_hyphen = false;

    for c in title.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c);
            prev_hyphen = false;
        } else if !prev_hyphen {
            result.push('-');
            prev_hyphen = true;
        }
    }

    result.trim_matches('-').to_string()
}

/// Random lowercase alphanumeric suffix of [`SLUG_SUFFIX_LEN`] characters.
pub fn random_slug_suffix() -> String {
    let mut rng = rand::rng();
    (0..SLUG_SUFFIX_LEN)
        .map(|_| SLUG_SUFFIX_CHARSET[rng.random_range(0..SLUG_SUFFIX_CHARSET.len())] as char)
        .collect()
}

/// Build a public slug: `slugify(title)` plus a random suffix.
///
/// The suffix makes collisions unlikely but not impossible; the unique index
/// on `entries.slug` is the real guarantee and callers retry on conflict.
pub fn generate_slug(title: &str) -> String {
    let base = slugify(title);
    let suffix = random_slug_suffix();
    if base.is_empty() {
        suffix
    } else {
        format!("{base}-{suffix}")
    }
}

// ---------------------------------------------------------------------------
// Field validation
// ---------------------------------------------------------------------------

/// Entry fields after validation and normalisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFields {
    pub title: String,
    pub description: Option<String>,
}

/// Validate title and description for create and update.
///
/// The title is trimmed and must be non-empty and at most
/// [`TITLE_MAX_LEN`] characters. A blank description becomes `None`.
pub fn validate_entry_fields(
    title: Option<&str>,
    description: Option<&str>,
) -> Result<EntryFields, CoreError> {
    let mut errors = FieldErrors::new();

    let title = title.map(str::trim).unwrap_or_default();
    if title.is_empty() {
        errors.add("title", "The title field is required.");
    } else if char_len(title) > TITLE_MAX_LEN {
        errors.add(
            "title",
            format!("The title field must not be greater than {TITLE_MAX_LEN} characters."),
        );
    }

    errors.into_result()?;

    let description = description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    Ok(EntryFields {
        title: title.to_string(),
        description,
    })
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

/// Sort order for the owner's entry list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySort {
    /// Creation time, newest first.
    #[default]
    Newest,
    /// Creation time, oldest first.
    Oldest,
    /// Feedback count, highest first.
    Popular,
}

impl EntrySort {
    /// Parse the `sort` query parameter. Missing or unknown values fall back
    /// to [`EntrySort::Newest`].
    pub fn from_param(param: Option<&str>) -> Self {
        match param.map(str::trim) {
            Some("oldest") => EntrySort::Oldest,
            Some("popular") => EntrySort::Popular,
            _ => EntrySort::Newest,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntrySort::Newest => "newest",
            EntrySort::Oldest => "oldest",
            EntrySort::Popular => "popular",
        }
    }
}

/// Normalise the `search` query parameter; blank means no filter.
pub fn normalize_search(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Escape `LIKE` wildcards so the search term is matched literally.
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
