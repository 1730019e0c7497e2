use chrono::{DateTime, Utc};
use quiz_core::model::{AnswerResult, Question, RoundConfig, RoundSummary};
use quiz_core::scoring::ScoreInput;

use super::countdown::TickSettings;
use super::progress::SessionProgress;
use super::workflow::CompletionReport;
use crate::error::SessionError;

//
// ─── PHASES AND EVENTS ─────────────────────────────────────────────────────────
//

/// Where a round is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    Idle,
    /// Question `i` is live and its countdown is running.
    Presenting(usize),
    /// Question `i` has a result; waiting for the reveal pause to end.
    Revealed(usize),
    Completed,
    Cancelled,
}

impl RoundPhase {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, RoundPhase::Completed | RoundPhase::Cancelled)
    }
}

/// Something the host should render or react to.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundEvent {
    Presented {
        index: usize,
        total: usize,
        question: Question,
        time_limit_secs: u32,
    },
    Ticked {
        index: usize,
        remaining_secs: u32,
        settings: TickSettings,
    },
    Answered {
        index: usize,
        result: AnswerResult,
        /// Streak reached the combo threshold on this answer.
        combo: bool,
        score: u64,
    },
    Completed {
        correct: usize,
        total: usize,
        score: u64,
        best_streak: u32,
    },
    Cancelled,
}

/// Mutable per-round counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub current_index: usize,
    pub score: u64,
    pub streak: u32,
    pub best_streak: u32,
    pub time_remaining_secs: u32,
    pub answered: bool,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One round of timed questions, driven by explicit steps.
///
/// `start` presents the first question, `tick` counts it down, `submit_answer`
/// records at most one answer per question, `advance` moves past the reveal,
/// and `cancel` abandons the round. Steps that do not apply to the current
/// phase return `None` and change nothing.
///
/// A session is not `Clone`: it owns its completion marker, so a copy could be
/// persisted a second time.
///
/// ```compile_fail
/// fn assert_clone<T: Clone>() {}
/// assert_clone::<services::RoundSession>();
/// ```
#[derive(Debug)]
pub struct RoundSession {
    config: RoundConfig,
    questions: Vec<Question>,
    results: Vec<AnswerResult>,
    phase: RoundPhase,
    state: SessionState,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    completion: Option<CompletionReport>,
}

impl RoundSession {
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if `questions` is empty.
    pub fn new(config: RoundConfig, questions: Vec<Question>) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }
        Ok(Self {
            config,
            results: Vec::with_capacity(questions.len()),
            questions,
            phase: RoundPhase::Idle,
            state: SessionState::default(),
            started_at: None,
            completed_at: None,
            completion: None,
        })
    }

    /// `Idle → Presenting(0)`.
    pub fn start(&mut self, now: DateTime<Utc>) -> Option<RoundEvent> {
        if self.phase != RoundPhase::Idle {
            return None;
        }
        self.started_at = Some(now);
        tracing::info!(
            category = self.config.category(),
            tier = self.config.tier().name(),
            questions = self.questions.len(),
            "round started"
        );
        Some(self.present(0))
    }

    /// One countdown second elapsed. Reaching zero unanswered is a timeout.
    pub fn tick(&mut self, settings: TickSettings) -> Option<RoundEvent> {
        let RoundPhase::Presenting(index) = self.phase else {
            return None;
        };
        if self.state.answered {
            return None;
        }

        self.state.time_remaining_secs = self.state.time_remaining_secs.saturating_sub(1);
        if self.state.time_remaining_secs == 0 {
            tracing::debug!(index, "question timed out");
            return self.record(index, None);
        }
        Some(RoundEvent::Ticked {
            index,
            remaining_secs: self.state.time_remaining_secs,
            settings,
        })
    }

    /// Answer the live question. `None` is an explicit timeout.
    ///
    /// A second submission for the same question, or a label that is not one
    /// of its choices, is ignored.
    pub fn submit_answer(&mut self, label: Option<&str>) -> Option<RoundEvent> {
        let RoundPhase::Presenting(index) = self.phase else {
            return None;
        };
        if self.state.answered {
            return None;
        }
        if let Some(label) = label {
            if !self.questions[index].has_choice(label) {
                tracing::debug!(index, label, "ignoring answer that is not a choice");
                return None;
            }
        }
        self.record(index, label)
    }

    /// `Revealed(i) → Presenting(i + 1)`, or `Completed` after the last question.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Option<RoundEvent> {
        let RoundPhase::Revealed(index) = self.phase else {
            return None;
        };
        let next = index + 1;
        if next < self.questions.len() {
            return Some(self.present(next));
        }

        self.phase = RoundPhase::Completed;
        self.completed_at = Some(now);
        let correct = self.results.iter().filter(|r| r.correct).count();
        tracing::info!(
            correct,
            total = self.questions.len(),
            score = self.state.score,
            "round completed"
        );
        Some(RoundEvent::Completed {
            correct,
            total: self.questions.len(),
            score: self.state.score,
            best_streak: self.state.best_streak,
        })
    }

    /// Abandon the round. Nothing from a cancelled round is persisted.
    pub fn cancel(&mut self) -> Option<RoundEvent> {
        if self.phase.is_terminal() {
            return None;
        }
        self.phase = RoundPhase::Cancelled;
        tracing::info!(answered = self.results.len(), "round cancelled");
        Some(RoundEvent::Cancelled)
    }

    fn present(&mut self, index: usize) -> RoundEvent {
        let limit = self.config.tier().time_limit_secs();
        self.phase = RoundPhase::Presenting(index);
        self.state.current_index = index;
        self.state.time_remaining_secs = limit;
        self.state.answered = false;
        tracing::debug!(index, "question presented");
        RoundEvent::Presented {
            index,
            total: self.questions.len(),
            question: self.questions[index].clone(),
            time_limit_secs: limit,
        }
    }

    fn record(&mut self, index: usize, label: Option<&str>) -> Option<RoundEvent> {
        // Marking the question answered disables any further tick or answer.
        self.state.answered = true;

        let question = &self.questions[index];
        let tier = self.config.tier();
        let correct = label.is_some_and(|l| question.is_correct(l));
        let remaining = self.state.time_remaining_secs;
        let outcome = self.config.scoring().score(ScoreInput {
            correct,
            time_remaining_secs: f64::from(remaining),
            time_limit_secs: f64::from(tier.time_limit_secs()),
            prior_streak: self.state.streak,
            base_points: tier.base_points(),
        });

        self.state.streak = outcome.streak;
        self.state.best_streak = self.state.best_streak.max(outcome.streak);
        self.state.score = self.state.score.saturating_add(u64::from(outcome.points));

        let result = AnswerResult {
            question: question.clone(),
            chosen_label: label.map(str::to_owned),
            correct,
            points_awarded: outcome.points,
            time_used_secs: tier.time_limit_secs().saturating_sub(remaining),
            streak_after: outcome.streak,
        };
        self.results.push(result.clone());
        self.phase = RoundPhase::Revealed(index);

        if outcome.combo {
            tracing::debug!(index, streak = outcome.streak, "combo");
        }
        Some(RoundEvent::Answered {
            index,
            result,
            combo: outcome.combo,
            score: self.state.score,
        })
    }

    /// Summary of a completed round.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Cancelled` for a cancelled round,
    /// `SessionError::NotCompleted` if the round is still running, or
    /// `SessionError::Summary` if the timestamps are inconsistent.
    pub fn summary(&self) -> Result<RoundSummary, SessionError> {
        match self.phase {
            RoundPhase::Completed => {}
            RoundPhase::Cancelled => return Err(SessionError::Cancelled),
            _ => return Err(SessionError::NotCompleted),
        }
        let (Some(started_at), Some(completed_at)) = (self.started_at, self.completed_at) else {
            return Err(SessionError::NotCompleted);
        };
        Ok(RoundSummary::from_results(
            self.config.category(),
            self.config.tier().name(),
            started_at,
            completed_at,
            &self.results,
        )?)
    }

    #[must_use]
    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    #[must_use]
    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn results(&self) -> &[AnswerResult] {
        &self.results
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            RoundPhase::Presenting(i) | RoundPhase::Revealed(i) => self.questions.get(i),
            _ => None,
        }
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == RoundPhase::Completed
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.questions.len(),
            answered: self.results.len(),
            remaining: self.questions.len().saturating_sub(self.results.len()),
            is_complete: self.is_complete(),
        }
    }

    /// Report from the completion that persisted this round, if any.
    #[must_use]
    pub fn completion(&self) -> Option<&CompletionReport> {
        self.completion.as_ref()
    }

    pub(crate) fn set_completion(&mut self, report: CompletionReport) {
        self.completion = Some(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{DifficultyTier, ProblemEntry, Value, ValueKind};
    use quiz_core::time::fixed_now;

    fn questions(n: i64) -> Vec<Question> {
        (1..=n)
            .map(|i| {
                let entry = ProblemEntry::new(
                    "math",
                    format!("{i} × 10"),
                    Value::Integer(i * 10),
                    ValueKind::Integer,
                )
                .unwrap();
                let distractors = [
                    Value::Integer(i * 10 + 1),
                    Value::Integer(i * 10 + 2),
                    Value::Integer(i * 10 + 3),
                ];
                Question::assemble(&entry, &distractors, [1, 0, 2, 3]).unwrap()
            })
            .collect()
    }

    fn session(n: i64) -> RoundSession {
        let tier = DifficultyTier::new("test", 10, 20).unwrap();
        let config = RoundConfig::new("math", tier, 10).unwrap();
        RoundSession::new(config, questions(n)).unwrap()
    }

    fn tick_n(session: &mut RoundSession, n: u32) {
        for _ in 0..n {
            session.tick(TickSettings::default());
        }
    }

    fn answer_correct(session: &mut RoundSession) -> Option<RoundEvent> {
        let label = session.current_question().unwrap().correct_label().to_owned();
        session.submit_answer(Some(&label))
    }

    #[test]
    fn rejects_empty_round() {
        let config = RoundConfig::new("math", DifficultyTier::normal(), 10).unwrap();
        assert!(matches!(
            RoundSession::new(config, Vec::new()),
            Err(SessionError::Empty)
        ));
    }

    #[test]
    fn three_fast_answers_build_a_combo_then_timeout_resets() {
        let mut s = session(10);
        s.start(fixed_now()).unwrap();

        let mut points = Vec::new();
        for i in 0..3 {
            tick_n(&mut s, 2);
            let Some(RoundEvent::Answered { result, combo, .. }) = answer_correct(&mut s) else {
                panic!("expected an answer event");
            };
            assert_eq!(result.time_used_secs, 2);
            assert_eq!(combo, i == 2);
            points.push(result.points_awarded);
            s.advance(fixed_now()).unwrap();
        }
        assert_eq!(points, [36, 36, 51]);
        assert_eq!(s.state().streak, 3);

        tick_n(&mut s, 9);
        let Some(RoundEvent::Answered { result, .. }) = s.tick(TickSettings::default()) else {
            panic!("tenth tick must time the question out");
        };
        assert!(result.timed_out());
        assert!(!result.correct);
        assert_eq!(result.points_awarded, 0);
        assert_eq!(result.time_used_secs, 10);
        assert_eq!(s.state().streak, 0);
        assert_eq!(s.state().best_streak, 3);
        assert_eq!(s.state().score, 123);
    }

    #[test]
    fn second_submission_and_late_ticks_are_ignored() {
        let mut s = session(2);
        s.start(fixed_now()).unwrap();
        assert!(answer_correct(&mut s).is_some());
        assert!(s.submit_answer(Some("11")).is_none());
        assert!(s.submit_answer(None).is_none());
        assert!(s.tick(TickSettings::default()).is_none());
        assert_eq!(s.results().len(), 1);
        assert_eq!(s.phase(), RoundPhase::Revealed(0));
    }

    #[test]
    fn labels_outside_the_choices_are_not_scored() {
        let mut s = session(1);
        s.start(fixed_now()).unwrap();
        assert!(s.submit_answer(Some("999")).is_none());
        assert_eq!(s.phase(), RoundPhase::Presenting(0));
        assert!(s.results().is_empty());

        let Some(RoundEvent::Answered { result, .. }) = s.submit_answer(Some("11")) else {
            panic!("a wrong choice is still an answer");
        };
        assert!(!result.correct);
        assert!(!result.timed_out());
    }

    #[test]
    fn explicit_timeout_is_incorrect() {
        let mut s = session(1);
        s.start(fixed_now()).unwrap();
        let Some(RoundEvent::Answered { result, .. }) = s.submit_answer(None) else {
            panic!("expected timeout result");
        };
        assert!(result.timed_out());
        assert_eq!(result.points_awarded, 0);
    }

    #[test]
    fn completes_with_one_result_per_question_in_order() {
        let mut s = session(4);
        let start = fixed_now();
        s.start(start).unwrap();
        for _ in 0..4 {
            answer_correct(&mut s).unwrap();
            s.advance(start + chrono::Duration::seconds(30));
        }
        assert!(s.is_complete());
        assert_eq!(s.results().len(), s.questions().len());
        for (result, question) in s.results().iter().zip(s.questions()) {
            assert_eq!(&result.question, question);
        }

        let summary = s.summary().unwrap();
        assert_eq!(summary.correct(), 4);
        assert!(summary.is_perfect());
        assert_eq!(summary.best_streak(), 4);
        assert_eq!(s.progress().remaining, 0);

        assert!(s.advance(start).is_none());
        assert!(s.cancel().is_none());
    }

    #[test]
    fn cancel_is_terminal_and_blocks_summary() {
        let mut s = session(3);
        assert!(s.tick(TickSettings::default()).is_none());
        s.start(fixed_now()).unwrap();
        assert_eq!(s.cancel(), Some(RoundEvent::Cancelled));
        assert!(s.start(fixed_now()).is_none());
        assert!(answer_correct(&mut s).is_none());
        assert!(matches!(s.summary(), Err(SessionError::Cancelled)));
    }

    #[test]
    fn summary_requires_completion() {
        let mut s = session(2);
        s.start(fixed_now()).unwrap();
        assert!(matches!(s.summary(), Err(SessionError::NotCompleted)));
    }
}
