//! Round assembly: sample a pool, synthesize distractors, shuffle choices.

use thiserror::Error;

use crate::distractor::DistractorSynthesizer;
use crate::model::{CHOICES_PER_QUESTION, ProblemEntry, Question, QuestionError};
use crate::random::{RandomSource, shuffle};
use crate::source::{CatalogError, QuestionSource};

/// What to do when a category holds fewer entries than the requested size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PoolShortfall {
    /// Return a shorter round. Logged at `warn`.
    #[default]
    Truncate,
    /// Refuse with [`RoundError::InsufficientPool`].
    Fail,
    /// Start a fresh pass over the pool once every entry has been used.
    Repeat,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RoundError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("category {0} has no problems")]
    EmptyPool(String),

    #[error("round size must be > 0")]
    InvalidRoundSize,

    #[error("category {category} has {available} problems, {requested} requested")]
    InsufficientPool {
        category: String,
        requested: usize,
        available: usize,
    },

    #[error(transparent)]
    Question(#[from] QuestionError),
}

/// Builds the ordered question list for one round.
pub struct RoundBuilder<'a, S: QuestionSource + ?Sized> {
    source: &'a S,
    synthesizer: DistractorSynthesizer,
}

impl<'a, S: QuestionSource + ?Sized> RoundBuilder<'a, S> {
    #[must_use]
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            synthesizer: DistractorSynthesizer::default(),
        }
    }

    #[must_use]
    pub fn with_synthesizer(mut self, synthesizer: DistractorSynthesizer) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    /// Draw `size` entries from `category` and turn each into a question
    /// with one correct and three synthesized choices in shuffled order.
    ///
    /// Entries are drawn without replacement; `shortfall` decides what
    /// happens when the pool is smaller than `size`.
    ///
    /// # Errors
    ///
    /// Returns `RoundError` for an unknown category, an empty pool, a zero
    /// size, or a short pool under [`PoolShortfall::Fail`].
    pub fn build<R: RandomSource + ?Sized>(
        &self,
        category: &str,
        size: usize,
        shortfall: PoolShortfall,
        rng: &mut R,
    ) -> Result<Vec<Question>, RoundError> {
        if size == 0 {
            return Err(RoundError::InvalidRoundSize);
        }
        let pool = self.source.pool(category)?;
        if pool.is_empty() {
            return Err(RoundError::EmptyPool(category.to_owned()));
        }

        let picks = sample(&pool, size, shortfall, rng).ok_or_else(|| {
            RoundError::InsufficientPool {
                category: category.to_owned(),
                requested: size,
                available: pool.len(),
            }
        })?;
        if picks.len() < size {
            tracing::warn!(
                category,
                requested = size,
                available = pool.len(),
                "pool smaller than round size, truncating round"
            );
        }

        let questions = picks
            .into_iter()
            .map(|entry| self.question(entry, rng))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(category, questions = questions.len(), "round built");
        Ok(questions)
    }

    fn question<R: RandomSource + ?Sized>(
        &self,
        entry: &ProblemEntry,
        rng: &mut R,
    ) -> Result<Question, QuestionError> {
        let distractors = self
            .synthesizer
            .synthesize_for(entry, CHOICES_PER_QUESTION - 1, rng);
        let mut order = [0, 1, 2, 3];
        shuffle(rng, &mut order);
        Question::assemble(entry, &distractors, order)
    }
}

/// Picks entries without replacement. `None` means the pool is short and
/// the policy forbids a smaller or repeating round.
fn sample<'p, R: RandomSource + ?Sized>(
    pool: &[&'p ProblemEntry],
    size: usize,
    shortfall: PoolShortfall,
    rng: &mut R,
) -> Option<Vec<&'p ProblemEntry>> {
    if pool.len() < size && shortfall == PoolShortfall::Fail {
        return None;
    }

    let mut picks = Vec::with_capacity(size);
    loop {
        let mut pass: Vec<&ProblemEntry> = pool.to_vec();
        shuffle(rng, &mut pass);
        let needed = size - picks.len();
        picks.extend(pass.into_iter().take(needed));
        if picks.len() >= size || shortfall != PoolShortfall::Repeat {
            return Some(picks);
        }
    }
}
