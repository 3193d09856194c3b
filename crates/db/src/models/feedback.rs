//! Feedback submission model and DTOs.

use chrono::NaiveDate;
use formdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A feedback row from the `feedbacks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Feedback {
    pub id: DbId,
    pub entry_id: DbId,
    pub submitted_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A feedback row plus how many answers it carries, for list views.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FeedbackSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub feedback: Feedback,
    pub answer_count: i64,
}

/// Submissions per UTC calendar day, as grouped by the database.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct DailyCountRow {
    pub day: NaiveDate,
    pub count: i64,
}

/// Public submission body: answers keyed by question id.
///
/// `answers` stays raw JSON so a wrong shape, or a structured value for one
/// question, is reported as a field error rather than a body rejection.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SubmitFeedback {
    #[serde(default)]
    pub answers: serde_json::Value,
}
