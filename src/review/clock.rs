//! One-second countdown driven by the tokio runtime.
//!
//! A `Clock` owns at most one ticking task. Starting it again replaces the
//! running countdown, and cancelling is safe at any time.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    /// One second elapsed; carries the new remaining count.
    Tick(u32),
    /// The countdown reached zero. Always the last event of a run.
    Expired,
}

pub struct Clock {
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl Clock {
    pub fn new() -> Self {
        Self::with_period(Duration::from_secs(1))
    }

    pub fn with_period(period: Duration) -> Self {
        Self { period, task: None }
    }

    /// Starts counting down from `total_seconds`, cancelling any previous run.
    ///
    /// `on_event` is called from the ticking task, never from inside `start`.
    /// A zero start emits `Expired` right away.
    pub fn start<F>(&mut self, total_seconds: u32, mut on_event: F)
    where
        F: FnMut(ClockEvent) + Send + 'static,
    {
        self.cancel();

        let period = self.period;
        self.task = Some(tokio::spawn(async move {
            let mut remaining = total_seconds;
            let mut interval = interval_at(Instant::now() + period, period);

            while remaining > 0 {
                interval.tick().await;
                remaining -= 1;
                trace!("Clock tick: {} remaining", remaining);
                on_event(ClockEvent::Tick(remaining));
            }

            on_event(ClockEvent::Expired);
        }));
    }

    /// Stops ticking. No-op when nothing is running.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Clock {
    fn drop(&mut self) {
        self.cancel();
    }
}
