//! Rendering of stored answers for the owner's feedback detail view.

use serde::Serialize;

use crate::question::{QuestionType, RATING_MAX};

/// How a single answer should be presented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerDisplay {
    Rating { score: i64, max: i64 },
    Choice { label: String },
    Email { address: String, href: String },
    Text { text: String },
}

impl AnswerDisplay {
    /// Render `value` according to the question's type.
    ///
    /// A rating that does not parse as an integer is shown as plain text.
    pub fn render(question_type: QuestionType, value: &str) -> Self {
        match question_type {
            QuestionType::Rating => match value.trim().parse::<i64>() {
                Ok(score) => AnswerDisplay::Rating {
                    score,
                    max: RATING_MAX,
                },
                Err(_) => AnswerDisplay::text(value),
            },
            QuestionType::MultipleChoice => AnswerDisplay::Choice {
                label: value.to_string(),
            },
            QuestionType::Email => AnswerDisplay::Email {
                address: value.to_string(),
                href: format!("mailto:{value}"),
            },
            QuestionType::Text | QuestionType::Name => AnswerDisplay::text(value),
        }
    }

    fn text(value: &str) -> Self {
        AnswerDisplay::Text {
            text: value.to_string(),
        }
    }
}
