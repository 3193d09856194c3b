//! Question rules: the five question kinds, field validation and reorder
//! validation.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::types::DbId;
use crate::validation::{char_len, FieldErrors};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum label length in characters.
pub const LABEL_MAX_LEN: usize = 255;

/// Maximum length of a single multiple-choice option.
pub const OPTION_MAX_LEN: usize = 255;

/// Lowest accepted rating value.
pub const RATING_MIN: i64 = 1;

/// Highest accepted rating value.
pub const RATING_MAX: i64 = 5;

// ---------------------------------------------------------------------------
// Question type
// ---------------------------------------------------------------------------

/// The kind of answer a question collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Rating,
    Text,
    MultipleChoice,
    Name,
    Email,
}

/// Every accepted question type, in the order clients should present them.
pub const QUESTION_TYPES: &[QuestionType] = &[
    QuestionType::Rating,
    QuestionType::Text,
    QuestionType::MultipleChoice,
    QuestionType::Name,
    QuestionType::Email,
];

impl QuestionType {
    /// The value stored in `questions.question_type`.
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::Rating => "rating",
            QuestionType::Text => "text",
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::Name => "name",
            QuestionType::Email => "email",
        }
    }

    pub fn has_options(self) -> bool {
        self == QuestionType::MultipleChoice
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QUESTION_TYPES
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = QUESTION_TYPES.iter().map(|t| t.as_str()).collect();
                CoreError::Validation(format!(
                    "Invalid question type '{s}'. Valid types: {}",
                    valid.join(", ")
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Field validation
// ---------------------------------------------------------------------------

/// Question fields after validation and normalisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionFields {
    pub label: String,
    pub question_type: QuestionType,
    pub is_required: bool,
    /// `Some` only for multiple-choice questions.
    pub options: Option<Vec<String>>,
}

/// Validate question input for create and update.
///
/// Options are trimmed and checked only for multiple-choice questions, which
/// must carry at least one. For every other type the options are dropped.
///
/// `is_required` accepts `true`/`false`, `1`/`0` and their string forms.
pub fn validate_question_fields(
    label: Option<&str>,
    question_type: Option<&str>,
    is_required: Option<&Value>,
    options: Option<&[String]>,
) -> Result<QuestionFields, CoreError> {
    let mut errors = FieldErrors::new();

    let required_flag = parse_flag(is_required);
    if required_flag.is_none() {
        errors.add("is_required", "The is_required field must be true or false.");
    }

    let label = label.map(str::trim).unwrap_or_default();
    if label.is_empty() {
        errors.add("label", "The label field is required.");
    } else if char_len(label) > LABEL_MAX_LEN {
        errors.add(
            "label",
            format!("The label field must not be greater than {LABEL_MAX_LEN} characters."),
        );
    }

    let parsed_type = match question_type.map(str::trim) {
        None | Some("") => {
            errors.add("type", "The type field is required.");
            None
        }
        Some(raw) => match raw.parse::<QuestionType>() {
            Ok(t) => Some(t),
            Err(_) => {
                errors.add("type", "The selected type is invalid.");
                None
            }
        },
    };

    let mut normalized_options = None;
    if let Some(QuestionType::MultipleChoice) = parsed_type {
        let cleaned: Vec<String> = options
            .unwrap_or_default()
            .iter()
            .map(|o| o.trim().to_string())
            .collect();

        if cleaned.is_empty() {
            errors.add(
                "options",
                "The options field is required when type is multiple_choice.",
            );
        }
        for (i, option) in cleaned.iter().enumerate() {
            if option.is_empty() {
                errors.add(format!("options.{i}"), "Options must not be blank.");
            } else if char_len(option) > OPTION_MAX_LEN {
                errors.add(
                    format!("options.{i}"),
                    format!("Options must not be greater than {OPTION_MAX_LEN} characters."),
                );
            }
        }
        normalized_options = Some(cleaned);
    }

    errors.into_result()?;

    // Both are guaranteed present once the error set is empty.
    let question_type = parsed_type
        .ok_or_else(|| CoreError::Internal("question type missing after validation".into()))?;

    Ok(QuestionFields {
        label: label.to_string(),
        question_type,
        is_required: required_flag.unwrap_or(false),
        options: normalized_options,
    })
}

/// Interpret a boolean-ish JSON value. Absent and null mean `false`.
fn parse_flag(value: Option<&Value>) -> Option<bool> {
    match value {
        None | Some(Value::Null) => Some(false),
        Some(Value::Bool(b)) => Some(*b),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Some(Value::String(s)) => match s.trim() {
            "1" | "true" => Some(true),
            "0" | "false" | "" => Some(false),
            _ => None,
        },
        Some(_) => None,
    }
}

/// Order value for a question appended after the current maximum.
pub fn next_sort_order(current_max: Option<i32>) -> i32 {
    current_max.map_or(0, |max| max + 1)
}

// ---------------------------------------------------------------------------
// Reordering
// ---------------------------------------------------------------------------

/// Read the ids of a reorder request. Integers and numeric strings are
/// accepted.
pub fn parse_question_ids(raw: &[Value]) -> Result<Vec<DbId>, CoreError> {
    let mut errors = FieldErrors::new();
    let mut ids = Vec::with_capacity(raw.len());

    for (i, value) in raw.iter().enumerate() {
        let id = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<DbId>().ok(),
            _ => None,
        };
        match id {
            Some(id) => ids.push(id),
            None => errors.add(format!("questions.{i}"), "Question ids must be integers."),
        }
    }

    errors.into_result()?;
    Ok(ids)
}

/// Validate a reorder request against the entry's current question ids.
///
/// The request must name every current question exactly once; the whole batch
/// is rejected otherwise.
pub fn validate_reorder(current: &[DbId], requested: &[DbId]) -> Result<(), CoreError> {
    let mut errors = FieldErrors::new();

    if requested.is_empty() {
        errors.add("questions", "The questions field is required.");
        return errors.into_result();
    }

    let current_set: HashSet<DbId> = current.iter().copied().collect();
    let mut seen = HashSet::with_capacity(requested.len());

    for (i, id) in requested.iter().enumerate() {
        if !current_set.contains(id) {
            errors.add(
                format!("questions.{i}"),
                format!("Question {id} does not belong to this entry."),
            );
        } else if !seen.insert(*id) {
            errors.add(
                format!("questions.{i}"),
                format!("Question {id} is listed more than once."),
            );
        }
    }

    let missing = current_set.iter().filter(|id| !seen.contains(id)).count();
    if errors.is_empty() && missing > 0 {
        errors.add(
            "questions",
            format!("The order must include every question of the entry ({missing} missing)."),
        );
    }

    errors.into_result()
}

/// Whether `requested` is exactly a permutation of `current`.
pub fn is_permutation_of(current: &[DbId], requested: &[DbId]) -> bool {
    validate_reorder(current, requested).is_ok()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn opts(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    // -- QuestionType --------------------------------------------------------

    #[test]
    fn type_round_trips_through_str() {
        for t in QUESTION_TYPES {
            assert_eq!(t.as_str().parse::<QuestionType>().unwrap(), *t);
        }
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert_matches!("checkbox".parse::<QuestionType>(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn type_serializes_snake_case() {
        let json = serde_json::to_value(QuestionType::MultipleChoice).unwrap();
        assert_eq!(json, "multiple_choice");
    }

    // -- validate_question_fields --------------------------------------------

    #[test]
    fn text_question_drops_options() {
        let fields = validate_question_fields(
            Some("Your thoughts"),
            Some("text"),
            Some(&json!(true)),
            Some(&opts(&["stale"])),
        )
        .unwrap();
        assert_eq!(fields.question_type, QuestionType::Text);
        assert!(fields.is_required);
        assert_eq!(fields.options, None);
    }

    #[test]
    fn is_required_defaults_to_false() {
        let fields = validate_question_fields(Some("Name"), Some("name"), None, None).unwrap();
        assert!(!fields.is_required);
    }

    #[test]
    fn multiple_choice_keeps_trimmed_options() {
        let fields = validate_question_fields(
            Some("Pick one"),
            Some("multiple_choice"),
            None,
            Some(&opts(&[" Red ", "Blue"])),
        )
        .unwrap();
        assert_eq!(fields.options, Some(opts(&["Red", "Blue"])));
    }

    #[test]
    fn multiple_choice_without_options_is_rejected() {
        let err =
            validate_question_fields(Some("Pick one"), Some("multiple_choice"), None, None)
                .unwrap_err();
        assert_matches!(err, CoreError::FieldValidation(e) if e.contains("options"));
    }

    #[test]
    fn blank_and_oversized_options_are_reported_by_index() {
        let long = "x".repeat(OPTION_MAX_LEN + 1);
        let err = validate_question_fields(
            Some("Pick one"),
            Some("multiple_choice"),
            None,
            Some(&[String::from("ok"), String::from(" "), long]),
        )
        .unwrap_err();
        assert_matches!(err, CoreError::FieldValidation(e)
            if e.contains("options.1") && e.contains("options.2") && !e.contains("options.0"));
    }

    #[test]
    fn missing_label_and_bad_type_reported_together() {
        let err = validate_question_fields(Some(" "), Some("slider"), None, None).unwrap_err();
        assert_matches!(err, CoreError::FieldValidation(e) if e.contains("label") && e.contains("type"));
    }

    #[test]
    fn label_length_limit() {
        let ok = "l".repeat(LABEL_MAX_LEN);
        let too_long = "l".repeat(LABEL_MAX_LEN + 1);
        assert!(validate_question_fields(Some(&ok), Some("text"), None, None).is_ok());
        assert!(validate_question_fields(Some(&too_long), Some("text"), None, None).is_err());
    }

    #[test]
    fn is_required_accepts_numeric_and_string_forms() {
        for (raw, expected) in [
            (json!(1), true),
            (json!("1"), true),
            (json!("true"), true),
            (json!(0), false),
            (json!("0"), false),
            (json!(null), false),
        ] {
            let fields =
                validate_question_fields(Some("Q"), Some("text"), Some(&raw), None).unwrap();
            assert_eq!(fields.is_required, expected, "raw value {raw}");
        }
    }

    #[test]
    fn is_required_rejects_other_values() {
        let err = validate_question_fields(Some("Q"), Some("text"), Some(&json!("yes")), None)
            .unwrap_err();
        assert_matches!(err, CoreError::FieldValidation(e) if e.contains("is_required"));
    }

    // -- next_sort_order -----------------------------------------------------

    #[test]
    fn first_question_gets_zero() {
        assert_eq!(next_sort_order(None), 0);
        assert_eq!(next_sort_order(Some(3)), 4);
    }

    // -- validate_reorder ----------------------------------------------------

    #[test]
    fn permutation_is_accepted() {
        assert!(validate_reorder(&[1, 2, 3], &[3, 1, 2]).is_ok());
    }

    #[test]
    fn foreign_id_rejects_batch() {
        let err = validate_reorder(&[1, 2, 3], &[3, 1, 99]).unwrap_err();
        assert_matches!(err, CoreError::FieldValidation(e) if e.contains("questions.2"));
    }

    #[test]
    fn duplicate_id_rejects_batch() {
        let err = validate_reorder(&[1, 2], &[1, 1]).unwrap_err();
        assert_matches!(err, CoreError::FieldValidation(e) if e.contains("questions.1"));
    }

    #[test]
    fn partial_list_rejects_batch() {
        let err = validate_reorder(&[1, 2, 3], &[2, 1]).unwrap_err();
        assert_matches!(err, CoreError::FieldValidation(e) if e.contains("questions"));
    }

    #[test]
    fn question_ids_accept_numeric_strings() {
        assert_eq!(
            parse_question_ids(&[json!(3), json!("12"), json!(" 7 ")]).unwrap(),
            vec![3, 12, 7]
        );
    }

    #[test]
    fn non_numeric_question_ids_are_reported_by_index() {
        let err = parse_question_ids(&[json!(1), json!("abc"), json!(1.5), json!(null)]).unwrap_err();
        assert_matches!(err, CoreError::FieldValidation(e)
            if e.contains("questions.1") && e.contains("questions.2") && e.contains("questions.3")
                && !e.contains("questions.0"));
    }

    #[test]
    fn empty_list_rejects_batch() {
        assert!(validate_reorder(&[1], &[]).is_err());
        assert!(!is_permutation_of(&[1], &[]));
    }
}
