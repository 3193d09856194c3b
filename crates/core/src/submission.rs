//! Validation of public feedback submissions.
//!
//! There is no static schema for a submission: the rule set is assembled on
//! every request from the entry's current question list, as a flat list of
//! `(field_key, constraint)` pairs, and then evaluated against the payload.

use std::collections::HashMap;

use serde_json::{Map, Value};
use validator::ValidateEmail;

use crate::error::CoreError;
use crate::question::{QuestionType, RATING_MAX, RATING_MIN};
use crate::types::DbId;
use crate::validation::FieldErrors;

/// The parts of a question that matter for validating an answer to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionQuestion {
    pub id: DbId,
    pub question_type: QuestionType,
    pub is_required: bool,
    pub options: Option<Vec<String>>,
}

/// One check applied to one answer field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// A non-blank value must be present.
    Required,
    /// When present, the value must be a syntactically valid email address.
    Email,
    /// When present, the value must be an integer in `min..=max`.
    RatingScale { min: i64, max: i64 },
    /// When present, the value must equal one of the listed options.
    OneOf(Vec<String>),
}

/// A constraint bound to the answer field it checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub field_key: String,
    pub question_id: DbId,
    pub constraint: Constraint,
}

/// A value that passed validation and should be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedAnswer {
    pub question_id: DbId,
    pub value: String,
}

/// Error key for the answer to `question_id`.
pub fn answer_field_key(question_id: DbId) -> String {
    format!("answers.{question_id}")
}

/// Per-request validator built from the current question list.
#[derive(Debug, Clone)]
pub struct SubmissionValidator {
    question_ids: Vec<DbId>,
    rules: Vec<Rule>,
}

impl SubmissionValidator {
    /// Assemble the rule list for `questions`, preserving their order.
    pub fn for_questions(questions: &[SubmissionQuestion]) -> Self {
        let mut rules = Vec::new();

        for q in questions {
            let key = answer_field_key(q.id);
            let mut push = |constraint| {
                rules.push(Rule {
                    field_key: key.clone(),
                    question_id: q.id,
                    constraint,
                })
            };

            if q.is_required {
                push(Constraint::Required);
            }
            match q.question_type {
                QuestionType::Email => push(Constraint::Email),
                QuestionType::Rating => push(Constraint::RatingScale {
                    min: RATING_MIN,
                    max: RATING_MAX,
                }),
                QuestionType::MultipleChoice => {
                    if let Some(options) = q.options.as_ref().filter(|o| !o.is_empty()) {
                        push(Constraint::OneOf(options.clone()));
                    }
                }
                QuestionType::Text | QuestionType::Name => {}
            }
        }

        Self {
            question_ids: questions.iter().map(|q| q.id).collect(),
            rules,
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Check `answers` (an object keyed by question id) against the rules.
    /// A missing or null payload is treated as an empty object.
    ///
    /// On success returns one [`AcceptedAnswer`] per question that received a
    /// non-blank value, in question order. Keys that are not questions of the
    /// entry are ignored.
    pub fn validate(&self, answers: &Value) -> Result<Vec<AcceptedAnswer>, CoreError> {
        let empty = Map::new();
        let answers = match answers {
            Value::Null => &empty,
            Value::Object(map) => map,
            _ => {
                return Err(CoreError::field(
                    "answers",
                    "The answers field must be an object keyed by question id.",
                ))
            }
        };

        let mut errors = FieldErrors::new();
        let mut values: HashMap<DbId, Option<String>> =
            HashMap::with_capacity(self.question_ids.len());

        for &id in &self.question_ids {
            match normalize_value(answers.get(&id.to_string())) {
                Ok(value) => {
                    values.insert(id, value);
                }
                Err(message) => errors.add(answer_field_key(id), message),
            }
        }

        for rule in &self.rules {
            // One message per field; later rules only run while it is clean.
            if errors.contains(&rule.field_key) {
                continue;
            }
            let value = values.get(&rule.question_id).and_then(Option::as_deref);
            if let Err(message) = check(&rule.constraint, value) {
                errors.add(rule.field_key.clone(), message);
            }
        }

        errors.into_result()?;

        Ok(self
            .question_ids
            .iter()
            .filter_map(|id| {
                values
                    .remove(id)
                    .flatten()
                    .map(|value| AcceptedAnswer {
                        question_id: *id,
                        value,
                    })
            })
            .collect())
    }
}

/// Reduce a raw JSON answer to a trimmed string, `None` when blank.
fn normalize_value(raw: Option<&Value>) -> Result<Option<String>, String> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err("The answer must be a single text or numeric value.".to_string()),
    }
}

fn check(constraint: &Constraint, value: Option<&str>) -> Result<(), String> {
    match (constraint, value) {
        (Constraint::Required, None) => Err("This question is required.".to_string()),
        (Constraint::Required, Some(_)) => Ok(()),
        // The remaining constraints only apply to supplied values.
        (_, None) => Ok(()),
        (Constraint::Email, Some(v)) => {
            if v.validate_email() {
                Ok(())
            } else {
                Err("The answer must be a valid email address.".to_string())
            }
        }
        (Constraint::RatingScale { min, max }, Some(v)) => match v.parse::<i64>() {
            Ok(n) if (*min..=*max).contains(&n) => Ok(()),
            _ => Err(format!("The rating must be a whole number between {min} and {max}.")),
        },
        (Constraint::OneOf(options), Some(v)) => {
            if options.iter().any(|o| o == v) {
                Ok(())
            } else {
                Err("The selected answer is not one of the options.".to_string())
            }
        }
    }
}
