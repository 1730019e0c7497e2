//! Per-question countdown driven by a tokio interval.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Host-side presentation settings read at every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSettings {
    pub sound_enabled: bool,
    /// Remaining seconds at or below which the host should warn.
    pub warn_at_secs: u32,
}

impl Default for TickSettings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            warn_at_secs: 5,
        }
    }
}

impl TickSettings {
    #[must_use]
    pub fn should_warn(&self, remaining_secs: u32) -> bool {
        self.sound_enabled && remaining_secs <= self.warn_at_secs
    }
}

/// One elapsed countdown second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownTick {
    /// Identifies the question the countdown was started for.
    pub generation: u64,
    /// Settings snapshot taken when the tick fired.
    pub settings: TickSettings,
}

/// A running countdown. Dropping or stopping it cancels the timer task.
///
/// Ticks already queued when the countdown stops still carry its
/// generation, so receivers must discard ticks whose generation is stale.
#[derive(Debug)]
pub struct CountdownHandle {
    generation: u64,
    task: JoinHandle<()>,
}

impl CountdownHandle {
    pub const DEFAULT_PERIOD: Duration = Duration::from_secs(1);

    /// Spawn a countdown that sends one tick per `period`, first after one
    /// full period. Must be called from within a tokio runtime.
    #[must_use]
    pub fn start(
        generation: u64,
        period: Duration,
        settings: watch::Receiver<TickSettings>,
        ticks: mpsc::Sender<CountdownTick>,
    ) -> Self {
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let snapshot = *settings.borrow();
                let tick = CountdownTick {
                    generation,
                    settings: snapshot,
                };
                if ticks.send(tick).await.is_err() {
                    tracing::debug!(generation, "tick receiver closed, stopping countdown");
                    break;
                }
            }
        });
        Self { generation, task }
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn stop(&self) {
        self.task.abort();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for CountdownHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period_with_generation() {
        let (_settings_tx, settings_rx) = watch::channel(TickSettings::default());
        let (tx, mut rx) = mpsc::channel(4);
        let start = Instant::now();
        let handle = CountdownHandle::start(7, Duration::from_secs(1), settings_rx, tx);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.generation, 7);
        assert_eq!(Instant::now() - start, Duration::from_secs(1));

        rx.recv().await.unwrap();
        assert_eq!(Instant::now() - start, Duration::from_secs(2));
        assert_eq!(handle.generation(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn each_tick_snapshots_current_settings() {
        let (settings_tx, settings_rx) = watch::channel(TickSettings::default());
        let (tx, mut rx) = mpsc::channel(4);
        let _handle = CountdownHandle::start(1, Duration::from_secs(1), settings_rx, tx);

        assert!(rx.recv().await.unwrap().settings.sound_enabled);
        settings_tx.send_modify(|s| s.sound_enabled = false);
        assert!(!rx.recv().await.unwrap().settings.sound_enabled);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_stops_ticks() {
        let (_settings_tx, settings_rx) = watch::channel(TickSettings::default());
        let (tx, mut rx) = mpsc::channel(4);
        let handle = CountdownHandle::start(3, Duration::from_secs(1), settings_rx, tx);
        rx.recv().await.unwrap();

        drop(handle);
        // The aborted task drops its sender, closing the channel.
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn warning_respects_sound_toggle() {
        let on = TickSettings::default();
        assert!(on.should_warn(5));
        assert!(!on.should_warn(6));
        let off = TickSettings {
            sound_enabled: false,
            ..on
        };
        assert!(!off.should_warn(1));
    }
}
