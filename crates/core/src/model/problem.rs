use thiserror::Error;

use crate::model::value::{Alphabet, Value, ValueKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProblemError {
    #[error("problem prompt cannot be empty")]
    EmptyPrompt,

    #[error("value {value} does not match kind {kind:?}")]
    KindMismatch { value: String, kind: ValueKind },

    #[error("radix must be between 2 and 36, got {0}")]
    InvalidRadix(u32),

    #[error("{value} is not a valid base-{radix} digit string")]
    InvalidDigits { value: String, radix: u32 },
}

/// One askable problem: the prompt and its single canonical answer.
///
/// Entries are immutable once built. `alternatives` are hand-authored wrong
/// answers supplied by the source (sibling translations, common slips); the
/// distractor synthesizer draws from them before mutating the answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemEntry {
    category: String,
    display: String,
    value: Value,
    kind: ValueKind,
    hint: Option<String>,
    example: Option<String>,
    alternatives: Vec<Value>,
}

impl ProblemEntry {
    /// # Errors
    ///
    /// Returns `ProblemError` if the prompt is blank, the value does not match
    /// `kind`, or a radix answer contains digits outside its base.
    pub fn new(
        category: impl Into<String>,
        display: impl Into<String>,
        value: Value,
        kind: ValueKind,
    ) -> Result<Self, ProblemError> {
        let display = display.into();
        if display.trim().is_empty() {
            return Err(ProblemError::EmptyPrompt);
        }
        if !value.matches_kind(&kind) {
            return Err(ProblemError::KindMismatch {
                value: value.label(),
                kind,
            });
        }
        if let (ValueKind::Symbolic(Alphabet::Radix(radix)), Value::Symbol(s)) = (kind, &value) {
            if !(2..=36).contains(&radix) {
                return Err(ProblemError::InvalidRadix(radix));
            }
            if s.is_empty() || !s.chars().all(|c| c.is_digit(radix) && !c.is_ascii_lowercase()) {
                return Err(ProblemError::InvalidDigits {
                    value: s.clone(),
                    radix,
                });
            }
        }

        Ok(Self {
            category: category.into(),
            display,
            value,
            kind,
            hint: None,
            example: None,
            alternatives: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    #[must_use]
    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    /// Attach hand-authored wrong answers. Values equal to the answer or of
    /// a different kind are dropped.
    #[must_use]
    pub fn with_alternatives(mut self, alternatives: impl IntoIterator<Item = Value>) -> Self {
        for alt in alternatives {
            if alt != self.value && alt.matches_kind(&self.kind) && !self.alternatives.contains(&alt)
            {
                self.alternatives.push(alt);
            }
        }
        self
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn display(&self) -> &str {
        &self.display
    }

    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    #[must_use]
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    #[must_use]
    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    #[must_use]
    pub fn example(&self) -> Option<&str> {
        self.example.as_deref()
    }

    #[must_use]
    pub fn alternatives(&self) -> &[Value] {
        &self.alternatives
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_prompt() {
        let err = ProblemEntry::new("math", "  ", Value::Integer(1), ValueKind::Integer).unwrap_err();
        assert_eq!(err, ProblemError::EmptyPrompt);
    }

    #[test]
    fn rejects_kind_mismatch() {
        let err =
            ProblemEntry::new("math", "1 + 1", Value::Integer(2), ValueKind::Decimal).unwrap_err();
        assert!(matches!(err, ProblemError::KindMismatch { .. }));
    }

    #[test]
    fn validates_radix_digits() {
        let kind = ValueKind::Symbolic(Alphabet::Radix(2));
        assert!(ProblemEntry::new("bases", "5 in binary", Value::symbol("101"), kind).is_ok());
        let err = ProblemEntry::new("bases", "5 in binary", Value::symbol("102"), kind).unwrap_err();
        assert!(matches!(err, ProblemError::InvalidDigits { radix: 2, .. }));

        let hex = ValueKind::Symbolic(Alphabet::Radix(16));
        assert!(ProblemEntry::new("bases", "255 in hex", Value::symbol("ff"), hex).is_err());
        assert!(ProblemEntry::new("bases", "255 in hex", Value::symbol("FF"), hex).is_ok());
    }

    #[test]
    fn alternatives_skip_answer_and_duplicates() {
        let entry = ProblemEntry::new(
            "animals",
            "dog",
            Value::symbol("perro"),
            ValueKind::Symbolic(Alphabet::Text),
        )
        .unwrap()
        .with_alternatives([
            Value::symbol("gato"),
            Value::symbol("perro"),
            Value::symbol("gato"),
            Value::Integer(4),
        ]);
        assert_eq!(entry.alternatives(), &[Value::symbol("gato")]);
    }
}
