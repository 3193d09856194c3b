//! Entry (feedback form) model and DTOs.

use formdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::status::{EntryStatus, StatusId};

/// An entry row from the `entries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Entry {
    pub id: DbId,
    pub user_id: DbId,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub status_id: StatusId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Entry {
    pub fn status(&self) -> Option<EntryStatus> {
        EntryStatus::from_id(self.status_id)
    }

    /// Whether the public form accepts responses.
    pub fn is_published(&self) -> bool {
        self.status() == Some(EntryStatus::Published)
    }
}

/// An entry plus its total number of feedback submissions, for list views.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EntryWithCount {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub entry: Entry,
    pub feedback_count: i64,
}

/// The fields of an entry shown on the public form and thank-you page.
#[derive(Debug, Clone, Serialize)]
pub struct PublicEntry {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
}

impl From<Entry> for PublicEntry {
    fn from(entry: Entry) -> Self {
        Self {
            slug: entry.slug,
            title: entry.title,
            description: entry.description,
        }
    }
}

/// DTO for creating a new entry. Fields are validated in `formdesk_core`, so
/// missing values surface as field errors instead of body rejections.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CreateEntry {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// DTO for updating an entry. Status is derived from the question count and
/// cannot be set here.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateEntry {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}
