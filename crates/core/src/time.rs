use chrono::{DateTime, Duration, Utc};

/// Wall-clock source for round timestamps.
///
/// Rounds only need wall time for `started_at` / `completed_at` on the
/// summary; the per-question countdown is tick driven and never reads it.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn system() -> Self {
        Self::System
    }

    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// Moves a fixed clock forward. No effect on `Clock::System`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }
}

/// Deterministic timestamp for tests (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_advances() {
        let mut clock = Clock::fixed(fixed_now());
        clock.advance(Duration::seconds(90));
        assert_eq!(clock.now(), fixed_now() + Duration::seconds(90));
    }

    #[test]
    fn system_clock_ignores_advance() {
        let mut clock = Clock::system();
        clock.advance(Duration::days(1));
        assert!(matches!(clock, Clock::System));
    }
}
