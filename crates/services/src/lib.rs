#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod sessions;
pub mod stats_service;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, SessionError};
pub use stats_service::{AchievementStatus, StatsService};

pub use sessions::{
    CompletionReport, CountdownHandle, QuizLoopService, RoundCommand, RoundEvent, RoundPhase,
    RoundRunner, RoundSession, RunOutcome, SessionProgress, SessionState, TickSettings,
};
