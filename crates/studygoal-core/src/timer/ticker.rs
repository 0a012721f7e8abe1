//! Periodic pulse source.
//!
//! A [`Ticker`] owns at most one tokio task. Starting it again aborts the
//! previous task first, so an engine never sees two pulse streams. Each
//! start bumps a generation number that travels with every pulse; the
//! receiver checks it with [`Ticker::is_current`] and drops pulses from a
//! stream that was stopped while the pulse was already in flight.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::error::TimerError;

/// Study-time cadence.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

/// Which timing source a machine currently wants pulsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockSource {
    /// Goal timer accumulation.
    Stopwatch,
    /// Subject countdown.
    Countdown,
    /// Interstitial between subjects.
    Preparation,
}

#[derive(Debug)]
pub struct Ticker {
    runtime: Handle,
    task: Option<JoinHandle<()>>,
    source: Option<ClockSource>,
    generation: u64,
}

impl Ticker {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            task: None,
            source: None,
            generation: 0,
        }
    }

    /// Bind to the runtime of the calling context.
    pub fn current() -> Result<Self, TimerError> {
        Ok(Self::new(Handle::try_current()?))
    }

    /// Begin pulsing `on_tick` once per `period`, first pulse one period
    /// from now. Any stream already running is stopped first.
    ///
    /// Returns the generation carried by this stream's pulses.
    pub fn start<F>(&mut self, source: ClockSource, period: Duration, mut on_tick: F) -> u64
    where
        F: FnMut(u64) + Send + 'static,
    {
        self.stop();
        self.generation = self.generation.wrapping_add(1);
        self.source = Some(source);

        let generation = self.generation;
        // interval_at panics on a zero period.
        let period = period.max(Duration::from_millis(1));
        let first = Instant::now() + period;
        self.task = Some(self.runtime.spawn(async move {
            let mut interval = tokio::time::interval_at(first, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                on_tick(generation);
            }
        }));
        tracing::trace!(?source, generation, "ticker started");
        generation
    }

    /// Halt delivery. Safe to call when nothing is running.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::trace!(source = ?self.source, generation = self.generation, "ticker stopped");
        }
        self.source = None;
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    pub fn source(&self) -> Option<ClockSource> {
        self.source
    }

    /// True when `generation` belongs to the stream that is running now.
    pub fn is_current(&self, generation: u64) -> bool {
        self.task.is_some() && self.generation == generation
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
