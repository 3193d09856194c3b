//! Question model and DTOs.

use formdesk_core::error::CoreError;
use formdesk_core::question::QuestionType;
use formdesk_core::submission::SubmissionQuestion;
use formdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A question row from the `questions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Question {
    pub id: DbId,
    pub entry_id: DbId,
    pub label: String,
    #[serde(rename = "type")]
    pub question_type: String,
    pub is_required: bool,
    #[serde(rename = "order")]
    pub sort_order: i32,
    pub options: Option<Json<Vec<String>>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Question {
    /// Parsed question type. The column is constrained by a CHECK, so a
    /// failure here means the schema and the code disagree.
    pub fn kind(&self) -> Result<QuestionType, CoreError> {
        self.question_type.parse::<QuestionType>().map_err(|_| {
            CoreError::Internal(format!(
                "question {} has unknown type '{}'",
                self.id, self.question_type
            ))
        })
    }

    pub fn option_list(&self) -> Option<&[String]> {
        self.options.as_ref().map(|o| o.0.as_slice())
    }

    /// The parts of this question the submission validator needs.
    pub fn to_submission_question(&self) -> Result<SubmissionQuestion, CoreError> {
        Ok(SubmissionQuestion {
            id: self.id,
            question_type: self.kind()?,
            is_required: self.is_required,
            options: self.option_list().map(<[String]>::to_vec),
        })
    }
}

/// Request body for creating or editing a question.
///
/// `is_required` is raw JSON because form clients send `"1"`, `1` or `true`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QuestionInput {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, rename = "type")]
    pub question_type: Option<String>,
    #[serde(default)]
    pub is_required: Option<serde_json::Value>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

/// Request body for reordering: every question id of the entry in its new
/// position. Ids may arrive as numbers or numeric strings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReorderQuestions {
    #[serde(default)]
    pub questions: Vec<serde_json::Value>,
}
