use thiserror::Error;

use crate::round::PoolShortfall;
use crate::scoring::ScoringRules;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("difficulty tier name cannot be empty")]
    EmptyTierName,

    #[error("time limit must be between 1 and 600 seconds, got {0}")]
    InvalidTimeLimit(u32),

    #[error("unknown difficulty tier: {0}")]
    UnknownTier(String),

    #[error("category cannot be empty")]
    EmptyCategory,

    #[error("round size must be > 0")]
    InvalidRoundSize,

    #[error("reveal pause must be at most 30 seconds, got {0}")]
    InvalidRevealPause(u32),

    #[error("combo threshold must be > 0")]
    InvalidComboThreshold,

    #[error("speed cutoff ratio must be in [0, 1], got {provided}")]
    InvalidSpeedCutoff { provided: f64 },

    #[error("speed multiplier must be finite and >= 0, got {provided}")]
    InvalidSpeedMultiplier { provided: f64 },
}

/// Named bundle of a per-question time limit and base points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifficultyTier {
    name: String,
    time_limit_secs: u32,
    base_points: u32,
}

impl DifficultyTier {
    /// # Errors
    ///
    /// Returns `ConfigError` for a blank name or a time limit outside 1..=600.
    pub fn new(
        name: impl Into<String>,
        time_limit_secs: u32,
        base_points: u32,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ConfigError::EmptyTierName);
        }
        if !(1..=600).contains(&time_limit_secs) {
            return Err(ConfigError::InvalidTimeLimit(time_limit_secs));
        }
        Ok(Self {
            name,
            time_limit_secs,
            base_points,
        })
    }

    #[must_use]
    pub fn easy() -> Self {
        Self::preset("easy", 20, 10)
    }

    #[must_use]
    pub fn normal() -> Self {
        Self::preset("normal", 15, 20)
    }

    #[must_use]
    pub fn hard() -> Self {
        Self::preset("hard", 10, 30)
    }

    fn preset(name: &str, time_limit_secs: u32, base_points: u32) -> Self {
        Self {
            name: name.to_owned(),
            time_limit_secs,
            base_points,
        }
    }

    /// All built-in tiers, easiest first.
    #[must_use]
    pub fn presets() -> [Self; 3] {
        [Self::easy(), Self::normal(), Self::hard()]
    }

    /// Look up a built-in tier by name (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownTier` if no preset matches.
    pub fn by_name(name: &str) -> Result<Self, ConfigError> {
        Self::presets()
            .into_iter()
            .find(|tier| tier.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| ConfigError::UnknownTier(name.to_owned()))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_secs
    }

    #[must_use]
    pub fn base_points(&self) -> u32 {
        self.base_points
    }
}

/// Everything needed to start a round.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundConfig {
    category: String,
    tier: DifficultyTier,
    round_size: u32,
    reveal_pause_secs: u32,
    scoring: ScoringRules,
    shortfall: PoolShortfall,
}

impl RoundConfig {
    pub const DEFAULT_ROUND_SIZE: u32 = 10;
    pub const DEFAULT_REVEAL_PAUSE_SECS: u32 = 2;

    /// # Errors
    ///
    /// Returns `ConfigError` for a blank category or a zero round size.
    pub fn new(
        category: impl Into<String>,
        tier: DifficultyTier,
        round_size: u32,
    ) -> Result<Self, ConfigError> {
        let category = category.into();
        if category.trim().is_empty() {
            return Err(ConfigError::EmptyCategory);
        }
        if round_size == 0 {
            return Err(ConfigError::InvalidRoundSize);
        }
        Ok(Self {
            category,
            tier,
            round_size,
            reveal_pause_secs: Self::DEFAULT_REVEAL_PAUSE_SECS,
            scoring: ScoringRules::default(),
            shortfall: PoolShortfall::default(),
        })
    }

    /// # Errors
    ///
    /// Returns `ConfigError::InvalidRevealPause` above 30 seconds.
    pub fn with_reveal_pause_secs(mut self, secs: u32) -> Result<Self, ConfigError> {
        if secs > 30 {
            return Err(ConfigError::InvalidRevealPause(secs));
        }
        self.reveal_pause_secs = secs;
        Ok(self)
    }

    #[must_use]
    pub fn with_scoring(mut self, scoring: ScoringRules) -> Self {
        self.scoring = scoring;
        self
    }

    #[must_use]
    pub fn with_shortfall(mut self, shortfall: PoolShortfall) -> Self {
        self.shortfall = shortfall;
        self
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn tier(&self) -> &DifficultyTier {
        &self.tier
    }

    #[must_use]
    pub fn round_size(&self) -> u32 {
        self.round_size
    }

    #[must_use]
    pub fn reveal_pause_secs(&self) -> u32 {
        self.reveal_pause_secs
    }

    #[must_use]
    pub fn scoring(&self) -> &ScoringRules {
        &self.scoring
    }

    #[must_use]
    pub fn shortfall(&self) -> PoolShortfall {
        self.shortfall
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_validation() {
        assert!(matches!(
            DifficultyTier::new(" ", 10, 20),
            Err(ConfigError::EmptyTierName)
        ));
        assert!(matches!(
            DifficultyTier::new("blitz", 0, 20),
            Err(ConfigError::InvalidTimeLimit(0))
        ));
        let tier = DifficultyTier::new("blitz", 5, 50).unwrap();
        assert_eq!(tier.time_limit_secs(), 5);
        assert_eq!(tier.base_points(), 50);
    }

    #[test]
    fn presets_are_found_by_name() {
        assert_eq!(DifficultyTier::by_name("HARD").unwrap(), DifficultyTier::hard());
        assert!(matches!(
            DifficultyTier::by_name("nightmare"),
            Err(ConfigError::UnknownTier(_))
        ));
        for tier in DifficultyTier::presets() {
            assert!(DifficultyTier::new(tier.name(), tier.time_limit_secs(), tier.base_points()).is_ok());
        }
    }

    #[test]
    fn round_config_defaults_and_validation() {
        let config = RoundConfig::new("arithmetic", DifficultyTier::normal(), 10).unwrap();
        assert_eq!(config.reveal_pause_secs(), RoundConfig::DEFAULT_REVEAL_PAUSE_SECS);
        assert_eq!(config.shortfall(), PoolShortfall::Truncate);
        assert_eq!(config.scoring(), &ScoringRules::default());

        assert!(matches!(
            RoundConfig::new("", DifficultyTier::normal(), 10),
            Err(ConfigError::EmptyCategory)
        ));
        assert!(matches!(
            RoundConfig::new("arithmetic", DifficultyTier::normal(), 0),
            Err(ConfigError::InvalidRoundSize)
        ));
        assert!(matches!(
            config.with_reveal_pause_secs(31),
            Err(ConfigError::InvalidRevealPause(31))
        ));
    }
}
