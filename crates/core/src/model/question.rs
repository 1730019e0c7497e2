use thiserror::Error;

use crate::model::problem::ProblemEntry;
use crate::model::value::Value;

/// Number of choices shown per question.
pub const CHOICES_PER_QUESTION: usize = 4;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("expected {expected} distractors, got {got}")]
    DistractorCount { expected: usize, got: usize },

    #[error("duplicate choice label: {0}")]
    DuplicateLabel(String),

    #[error("choice order is not a permutation: {0:?}")]
    InvalidOrder([usize; CHOICES_PER_QUESTION]),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub is_correct: bool,
}

/// A presented question. Built once per round and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    prompt: String,
    category: String,
    choices: [Choice; CHOICES_PER_QUESTION],
    correct_label: String,
    hint: Option<String>,
    example: Option<String>,
}

impl Question {
    /// Assemble a question from an entry and its distractors, in the given order.
    ///
    /// `order[i]` names the slot for choice `i`, where slot 0 is the correct
    /// answer and slots 1.. are the distractors in order.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the distractor count is wrong, any two
    /// labels collide, or `order` is not a permutation of the slots.
    pub fn assemble(
        entry: &ProblemEntry,
        distractors: &[Value],
        order: [usize; CHOICES_PER_QUESTION],
    ) -> Result<Self, QuestionError> {
        if distractors.len() != CHOICES_PER_QUESTION - 1 {
            return Err(QuestionError::DistractorCount {
                expected: CHOICES_PER_QUESTION - 1,
                got: distractors.len(),
            });
        }

        let correct_label = entry.value().label();
        let slots: Vec<Choice> = std::iter::once(Choice {
            label: correct_label.clone(),
            is_correct: true,
        })
        .chain(distractors.iter().map(|d| Choice {
            label: d.label(),
            is_correct: false,
        }))
        .collect();

        for (i, a) in slots.iter().enumerate() {
            if slots[..i].iter().any(|b| b.label == a.label) {
                return Err(QuestionError::DuplicateLabel(a.label.clone()));
            }
        }

        let mut seen = [false; CHOICES_PER_QUESTION];
        for &slot in &order {
            if slot >= CHOICES_PER_QUESTION || seen[slot] {
                return Err(QuestionError::InvalidOrder(order));
            }
            seen[slot] = true;
        }

        let choices = order.map(|slot| slots[slot].clone());

        Ok(Self {
            prompt: entry.display().to_owned(),
            category: entry.category().to_owned(),
            choices,
            correct_label,
            hint: entry.hint().map(str::to_owned),
            example: entry.example().map(str::to_owned),
        })
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn choices(&self) -> &[Choice; CHOICES_PER_QUESTION] {
        &self.choices
    }

    #[must_use]
    pub fn correct_label(&self) -> &str {
        &self.correct_label
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
    pub fn has_choice(&self, label: &str) -> bool {
        self.choices.iter().any(|c| c.label == label)
    }

    #[must_use]
    pub fn is_correct(&self, label: &str) -> bool {
        self.correct_label == label
    }
}

/// Outcome of one question. Exactly one per question, appended in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerResult {
    pub question: Question,
    /// `None` when the countdown ran out.
    pub chosen_label: Option<String>,
    pub correct: bool,
    pub points_awarded: u32,
    pub time_used_secs: u32,
    pub streak_after: u32,
}

impl AnswerResult {
    #[must_use]
    pub fn timed_out(&self) -> bool {
        self.chosen_label.is_none()
    }
}
