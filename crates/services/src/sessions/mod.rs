mod countdown;
mod machine;
mod progress;
mod runner;
mod workflow;

// Public API of the round subsystem.
pub use crate::error::SessionError;
pub use countdown::{CountdownHandle, CountdownTick, TickSettings};
pub use machine::{RoundEvent, RoundPhase, RoundSession, SessionState};
pub use progress::SessionProgress;
pub use runner::{RoundCommand, RoundRunner, RunOutcome};
pub use workflow::{CompletionReport, QuizLoopService};
