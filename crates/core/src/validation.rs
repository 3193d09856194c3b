//! Field-scoped validation errors.
//!
//! Validators collect every problem they find instead of stopping at the
//! first one, so a client can render all messages next to their fields in a
//! single round trip.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::CoreError;

/// Messages keyed by field path (`title`, `options.2`, `answers.17`, ...).
///
/// Keys are kept sorted so the serialized form is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `field`.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Messages recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// `Ok(())` when nothing was recorded, otherwise a
    /// [`CoreError::FieldValidation`] carrying every message.
    pub fn into_result(self) -> Result<(), CoreError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CoreError::FieldValidation(self))
        }
    }
}

/// Length in characters, not bytes, so multi-byte titles are not penalised.
pub fn char_len(value: &str) -> usize {
    value.chars().count()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn empty_errors_are_ok() {
        assert!(FieldErrors::new().into_result().is_ok());
    }

    #[test]
    fn messages_accumulate_per_field() {
        let mut errors = FieldErrors::new();
        errors.add("title", "The title field is required.");
        errors.add("title", "The title may not be greater than 255 characters.");
        errors.add("label", "The label field is required.");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("title").map(<[String]>::len), Some(2));
        assert_matches!(errors.into_result(), Err(CoreError::FieldValidation(e)) if e.contains("label"));
    }

    #[test]
    fn serializes_as_plain_map() {
        let mut errors = FieldErrors::new();
        errors.add("answers.3", "The field is required.");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["answers.3"][0], "The field is required.");
    }

    #[test]
    fn char_len_counts_characters() {
        assert_eq!(char_len("héllo"), 5);
    }
}
