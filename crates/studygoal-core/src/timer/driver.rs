//! Async driver that owns one engine and its ticker.
//!
//! All commands and pulses go through one mutex, so the engine state has a
//! single writer. After every command and every pulse the driver
//!
//! 1. starts, swaps or stops the ticker to match [`TickMachine::clock`],
//! 2. publishes a fresh snapshot on a `watch` channel,
//! 3. fans the produced events out on a `broadcast` channel.
//!
//! Dropping the last handle drops the ticker, which aborts its task.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{broadcast, watch};

use super::goal::GoalTimer;
use super::sequence::SequenceTimer;
use super::subject::Subject;
use super::ticker::{ClockSource, Ticker, DEFAULT_TICK_PERIOD};
use crate::error::TimerError;
use crate::events::Event;

const EVENT_CAPACITY: usize = 64;

/// An engine that advances one step per pulse.
pub trait TickMachine: Send + 'static {
    type Snapshot: Clone + Send + Sync + 'static;

    /// Handle one pulse. Must be a no-op when no clock is wanted.
    fn tick(&mut self) -> Vec<Event>;

    /// The timing source that should be pulsing right now, if any.
    fn clock(&self) -> Option<ClockSource>;

    fn snapshot(&self) -> Self::Snapshot;
}

struct Inner<M> {
    machine: M,
    ticker: Ticker,
}

struct Shared<M: TickMachine> {
    inner: Mutex<Inner<M>>,
    snapshots: watch::Sender<M::Snapshot>,
    events: broadcast::Sender<Event>,
    period: Duration,
}

impl<M: TickMachine> Shared<M> {
    fn lock(&self) -> MutexGuard<'_, Inner<M>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn pulse(self: &Arc<Self>, generation: u64) {
        let mut inner = self.lock();
        if !inner.ticker.is_current(generation) {
            tracing::trace!(generation, "dropping stale pulse");
            return;
        }
        let events = inner.machine.tick();
        self.settle(&mut inner, events);
    }

    fn settle(self: &Arc<Self>, inner: &mut Inner<M>, events: Vec<Event>) {
        let wanted = inner.machine.clock();
        if wanted != inner.ticker.source() {
            match wanted {
                Some(source) => {
                    let weak = Arc::downgrade(self);
                    inner.ticker.start(source, self.period, move |generation| {
                        if let Some(shared) = weak.upgrade() {
                            shared.pulse(generation);
                        }
                    });
                }
                None => inner.ticker.stop(),
            }
        }

        self.snapshots.send_replace(inner.machine.snapshot());
        for event in events {
            tracing::debug!(kind = event.kind(), "timer event");
            // No subscribers is fine.
            let _ = self.events.send(event);
        }
    }
}

/// Cloneable handle to a running engine.
pub struct TimerDriver<M: TickMachine> {
    shared: Arc<Shared<M>>,
}

impl<M: TickMachine> Clone for TimerDriver<M> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

pub type GoalDriver = TimerDriver<GoalTimer>;
pub type SequenceDriver = TimerDriver<SequenceTimer>;

impl<M: TickMachine> TimerDriver<M> {
    /// Wrap `machine` with a one-second ticker on the current tokio runtime.
    pub fn new(machine: M) -> Result<Self, TimerError> {
        Self::with_period(machine, DEFAULT_TICK_PERIOD)
    }

    pub fn with_period(machine: M, period: Duration) -> Result<Self, TimerError> {
        let ticker = Ticker::current()?;
        let (snapshots, _) = watch::channel(machine.snapshot());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let driver = Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner { machine, ticker }),
                snapshots,
                events,
                period,
            }),
        };
        // Publish once and start the ticker if `machine` was handed over already running.
        driver.update(|_| ());
        Ok(driver)
    }

    /// Run a command that may produce an event.
    pub fn command<F>(&self, f: F) -> Option<Event>
    where
        F: FnOnce(&mut M) -> Option<Event>,
    {
        let mut inner = self.shared.lock();
        let event = f(&mut inner.machine);
        self.shared
            .settle(&mut inner, event.iter().cloned().collect());
        event
    }

    /// Run an arbitrary mutation without an event.
    pub fn update<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut M) -> R,
    {
        let mut inner = self.shared.lock();
        let out = f(&mut inner.machine);
        self.shared.settle(&mut inner, Vec::new());
        out
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> M::Snapshot {
        self.shared.snapshots.borrow().clone()
    }

    /// Receiver that wakes on every state change.
    pub fn subscribe(&self) -> watch::Receiver<M::Snapshot> {
        self.shared.snapshots.subscribe()
    }

    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.shared.events.subscribe()
    }

    pub fn is_ticking(&self) -> bool {
        self.shared.lock().ticker.is_running()
    }

    pub fn clock(&self) -> Option<ClockSource> {
        self.shared.lock().ticker.source()
    }
}

impl TimerDriver<GoalTimer> {
    pub fn set_goal_minutes(&self, minutes: i64) -> Option<Event> {
        self.command(|t| t.set_goal_minutes(minutes))
    }

    pub fn start(&self) -> Option<Event> {
        self.command(GoalTimer::start)
    }

    pub fn pause(&self) -> Option<Event> {
        self.command(GoalTimer::pause)
    }

    pub fn toggle_running(&self) -> Option<Event> {
        self.command(GoalTimer::toggle_running)
    }

    pub fn toggle_focus(&self) -> Option<Event> {
        self.command(GoalTimer::toggle_focus)
    }

    pub fn reset(&self) -> Option<Event> {
        self.command(GoalTimer::reset)
    }
}

impl TimerDriver<SequenceTimer> {
    pub fn add_subject(&self, subject: Subject) -> Option<Event> {
        self.command(|t| t.add_subject(subject))
    }

    pub fn start(&self) -> Option<Event> {
        self.command(SequenceTimer::start)
    }

    pub fn pause(&self) -> Option<Event> {
        self.command(SequenceTimer::pause)
    }

    pub fn stop(&self) -> Option<Event> {
        self.command(SequenceTimer::stop)
    }

    pub fn next_subject(&self) -> Option<Event> {
        self.command(SequenceTimer::next_subject)
    }

    pub fn reset(&self) -> Option<Event> {
        self.command(SequenceTimer::reset)
    }

    /// Consume the one-shot alert. Returns whether it was set.
    pub fn acknowledge_alert(&self) -> bool {
        self.update(SequenceTimer::acknowledge_alert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_outside_runtime_fails() {
        assert!(matches!(
            GoalDriver::new(GoalTimer::new()),
            Err(TimerError::NoRuntime(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_follows_commands() {
        let driver = GoalDriver::new(GoalTimer::new()).unwrap();
        assert!(!driver.is_ticking());

        driver.start();
        assert_eq!(driver.clock(), Some(ClockSource::Stopwatch));

        driver.pause();
        assert!(!driver.is_ticking());
        driver.pause();
        assert!(!driver.is_ticking());
    }

    #[tokio::test(start_paused = true)]
    async fn command_publishes_snapshot_immediately() {
        let driver = GoalDriver::new(GoalTimer::new()).unwrap();
        let mut rx = driver.subscribe();
        driver.toggle_focus();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().focused);
    }
}
