//! Points and streak model.

use crate::model::ConfigError;

/// Tunable scoring constants.
///
/// Defaults: combo at a streak of 3, speed bonus only while more than 60% of
/// the time limit remains, `floor(remaining * 2)` speed points and
/// `streak * 5` combo points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringRules {
    combo_threshold: u32,
    speed_cutoff_ratio: f64,
    speed_multiplier: f64,
    streak_multiplier: u32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            combo_threshold: Self::DEFAULT_COMBO_THRESHOLD,
            speed_cutoff_ratio: Self::DEFAULT_SPEED_CUTOFF_RATIO,
            speed_multiplier: Self::DEFAULT_SPEED_MULTIPLIER,
            streak_multiplier: Self::DEFAULT_STREAK_MULTIPLIER,
        }
    }
}

/// Inputs for scoring a single answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreInput {
    pub correct: bool,
    pub time_remaining_secs: f64,
    pub time_limit_secs: f64,
    pub prior_streak: u32,
    pub base_points: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreOutcome {
    pub points: u32,
    pub streak: u32,
    /// Streak reached the combo threshold on this answer.
    pub combo: bool,
}

impl ScoringRules {
    pub const DEFAULT_COMBO_THRESHOLD: u32 = 3;
    pub const DEFAULT_SPEED_CUTOFF_RATIO: f64 = 0.6;
    pub const DEFAULT_SPEED_MULTIPLIER: f64 = 2.0;
    pub const DEFAULT_STREAK_MULTIPLIER: u32 = 5;

    /// # Errors
    ///
    /// Returns `ConfigError` if the combo threshold is zero, the cutoff ratio
    /// is outside `[0, 1]`, or the speed multiplier is negative or not finite.
    pub fn new(
        combo_threshold: u32,
        speed_cutoff_ratio: f64,
        speed_multiplier: f64,
        streak_multiplier: u32,
    ) -> Result<Self, ConfigError> {
        if combo_threshold == 0 {
            return Err(ConfigError::InvalidComboThreshold);
        }
        if !speed_cutoff_ratio.is_finite() || !(0.0..=1.0).contains(&speed_cutoff_ratio) {
            return Err(ConfigError::InvalidSpeedCutoff {
                provided: speed_cutoff_ratio,
            });
        }
        if !speed_multiplier.is_finite() || speed_multiplier < 0.0 {
            return Err(ConfigError::InvalidSpeedMultiplier {
                provided: speed_multiplier,
            });
        }
        Ok(Self {
            combo_threshold,
            speed_cutoff_ratio,
            speed_multiplier,
            streak_multiplier,
        })
    }

    #[must_use]
    pub fn combo_threshold(&self) -> u32 {
        self.combo_threshold
    }

    #[must_use]
    pub fn speed_cutoff_ratio(&self) -> f64 {
        self.speed_cutoff_ratio
    }

    /// Score one answer.
    ///
    /// Incorrect answers (timeouts included) score zero and reset the streak.
    /// Correct answers always score at least `base_points`.
    #[must_use]
    pub fn score(&self, input: ScoreInput) -> ScoreOutcome {
        if !input.correct {
            return ScoreOutcome {
                points: 0,
                streak: 0,
                combo: false,
            };
        }

        let streak = input.prior_streak.saturating_add(1);
        let combo = streak >= self.combo_threshold;
        let streak_bonus = if combo {
            streak.saturating_mul(self.streak_multiplier)
        } else {
            0
        };

        let points = input
            .base_points
            .saturating_add(self.speed_bonus(input.time_remaining_secs, input.time_limit_secs))
            .saturating_add(streak_bonus);

        ScoreOutcome {
            points,
            streak,
            combo,
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn speed_bonus(&self, remaining: f64, limit: f64) -> u32 {
        if !remaining.is_finite() || !limit.is_finite() || remaining <= 0.0 {
            return 0;
        }
        if remaining <= self.speed_cutoff_ratio * limit {
            return 0;
        }
        // `as` saturates for out-of-range floats.
        (remaining * self.speed_multiplier).floor() as u32
    }
}
