//! Async driver for a [`RoundSession`].
//!
//! The runner owns the session for the lifetime of the round. Host input
//! arrives as [`RoundCommand`]s, countdown ticks arrive from a
//! [`CountdownHandle`], and every state change goes back to the host as a
//! [`RoundEvent`]. Commands are polled first, so an answer that races the
//! final tick wins.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

use super::countdown::{CountdownHandle, CountdownTick, TickSettings};
use super::machine::{RoundEvent, RoundPhase, RoundSession};
use crate::Clock;

/// Input from the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundCommand {
    /// Choose a label. `None` gives up on the question.
    Answer(Option<String>),
    Cancel,
}

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// Every question has a result; the session is ready to be completed.
    Completed(RoundSession),
    Cancelled(RoundSession),
}

pub struct RoundRunner {
    session: RoundSession,
    clock: Clock,
    settings: watch::Receiver<TickSettings>,
    tick_period: Duration,
    reveal_pause: Duration,
}

impl RoundRunner {
    #[must_use]
    pub fn new(
        session: RoundSession,
        clock: Clock,
        settings: watch::Receiver<TickSettings>,
    ) -> Self {
        let reveal_pause = Duration::from_secs(u64::from(session.config().reveal_pause_secs()));
        Self {
            session,
            clock,
            settings,
            tick_period: CountdownHandle::DEFAULT_PERIOD,
            reveal_pause,
        }
    }

    #[must_use]
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    #[must_use]
    pub fn with_reveal_pause(mut self, pause: Duration) -> Self {
        self.reveal_pause = pause;
        self
    }

    /// Drive the round to completion or cancellation.
    ///
    /// Closing the command channel, or dropping the event receiver, cancels
    /// the round.
    pub async fn run(
        self,
        mut commands: mpsc::Receiver<RoundCommand>,
        events: mpsc::Sender<RoundEvent>,
    ) -> RunOutcome {
        let Self {
            mut session,
            clock,
            settings,
            tick_period,
            reveal_pause,
        } = self;

        let (tick_tx, mut tick_rx) = mpsc::channel::<CountdownTick>(8);
        let mut generation: u64 = 0;
        let mut reveal_deadline: Option<Instant> = None;

        let Some(first) = session.start(clock.now()) else {
            return RunOutcome::Cancelled(session);
        };
        if events.send(first).await.is_err() {
            session.cancel();
            return RunOutcome::Cancelled(session);
        }
        let mut countdown = Some(CountdownHandle::start(
            generation,
            tick_period,
            settings.clone(),
            tick_tx.clone(),
        ));

        loop {
            let emitted = match session.phase() {
                RoundPhase::Presenting(_) => {
                    tokio::select! {
                        biased;
                        command = commands.recv() => match command {
                            Some(RoundCommand::Answer(label)) => session.submit_answer(label.as_deref()),
                            Some(RoundCommand::Cancel) | None => session.cancel(),
                        },
                        Some(tick) = tick_rx.recv() => {
                            if tick.generation == generation {
                                session.tick(tick.settings)
                            } else {
                                tracing::debug!(stale = tick.generation, generation, "dropping stale tick");
                                None
                            }
                        }
                    }
                }
                RoundPhase::Revealed(_) => {
                    let deadline = *reveal_deadline.get_or_insert_with(|| Instant::now() + reveal_pause);
                    tokio::select! {
                        biased;
                        command = commands.recv() => match command {
                            // Too late for this question.
                            Some(RoundCommand::Answer(_)) => None,
                            Some(RoundCommand::Cancel) | None => session.cancel(),
                        },
                        () = tokio::time::sleep_until(deadline) => {
                            reveal_deadline = None;
                            session.advance(clock.now())
                        }
                    }
                }
                RoundPhase::Completed => return RunOutcome::Completed(session),
                RoundPhase::Idle | RoundPhase::Cancelled => return RunOutcome::Cancelled(session),
            };

            let Some(event) = emitted else {
                continue;
            };
            match &event {
                RoundEvent::Answered { .. } | RoundEvent::Completed { .. } | RoundEvent::Cancelled => {
                    if let Some(handle) = countdown.take() {
                        handle.stop();
                    }
                }
                RoundEvent::Presented { .. } => {
                    generation += 1;
                    countdown = Some(CountdownHandle::start(
                        generation,
                        tick_period,
                        settings.clone(),
                        tick_tx.clone(),
                    ));
                }
                RoundEvent::Ticked { .. } => {}
            }

            if events.send(event).await.is_err() {
                tracing::debug!("event receiver dropped, cancelling round");
                drop(countdown);
                session.cancel();
                return RunOutcome::Cancelled(session);
            }
        }
    }
}
