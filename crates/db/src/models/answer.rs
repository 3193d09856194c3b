//! Answer model.

use formdesk_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// An answer row from the `answers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Answer {
    pub id: DbId,
    pub feedback_id: DbId,
    pub question_id: DbId,
    pub value: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An answer joined with the question it responds to.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AnswerWithQuestion {
    pub id: DbId,
    pub feedback_id: DbId,
    pub question_id: DbId,
    pub value: String,
    pub question_label: String,
    pub question_type: String,
    pub question_order: i32,
}
