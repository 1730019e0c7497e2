mod config;
mod problem;
mod question;
mod stats;
mod summary;
mod value;

pub use config::{ConfigError, DifficultyTier, RoundConfig};
pub use problem::{ProblemEntry, ProblemError};
pub use question::{AnswerResult, CHOICES_PER_QUESTION, Choice, Question, QuestionError};
pub use stats::{Stats, StatsDraft};
pub use summary::{RoundSummary, RoundSummaryError};
pub use value::{Alphabet, DECIMAL_SCALE, Value, ValueKind};
