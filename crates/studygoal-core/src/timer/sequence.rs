//! Subject sequencer.
//!
//! Counts down each subject in order, inserts a fixed preparation
//! interstitial between subjects and raises a one-shot alert whenever a
//! countdown runs out.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> Counting --expiry | next_subject--> Preparing
//!                    ^                                    |
//!                    +------------- next in range --------+
//!                                                         |
//!                      Exhausted <---- past last subject -+
//! ```
//!
//! The subject countdown and the preparation countdown are never active
//! together; [`SequenceTimer::clock`] reports which one should be pulsed.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::countdown::{Countdown, CountdownTick};
use super::driver::TickMachine;
use super::subject::Subject;
use super::ticker::ClockSource;
use crate::events::Event;

/// Interstitial between two subjects, in seconds.
pub const DEFAULT_PREPARATION_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequencePhase {
    Idle,
    Counting,
    Preparing,
    Exhausted,
}

/// Read-only view of a [`SequenceTimer`] for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceSnapshot {
    pub phase: SequencePhase,
    pub subjects: Vec<Subject>,
    pub current_index: usize,
    pub current_subject: Option<String>,
    pub remaining_secs: u64,
    pub preparation_remaining_secs: u64,
    pub running: bool,
    pub preparing: bool,
    pub alert_pending: bool,
}

#[derive(Debug, Clone)]
pub struct SequenceTimer {
    subjects: Vec<Subject>,
    current_index: usize,
    countdown: Countdown,
    preparation: Countdown,
    preparation_secs: u64,
    auto_continue: bool,
    running: bool,
    preparing: bool,
    alert_pending: bool,
}

impl Default for SequenceTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceTimer {
    pub fn new() -> Self {
        Self {
            subjects: Vec::new(),
            current_index: 0,
            countdown: Countdown::new(),
            preparation: Countdown::new(),
            preparation_secs: DEFAULT_PREPARATION_SECS,
            auto_continue: true,
            running: false,
            preparing: false,
            alert_pending: false,
        }
    }

    pub fn with_preparation_secs(mut self, secs: u64) -> Self {
        self.preparation_secs = secs;
        self
    }

    /// When false, the sequence parks in `Idle` on the next subject after
    /// preparation instead of starting it.
    pub fn with_auto_continue(mut self, auto_continue: bool) -> Self {
        self.auto_continue = auto_continue;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_subject(&self) -> Option<&Subject> {
        self.subjects.get(self.current_index)
    }

    pub fn remaining_secs(&self) -> u64 {
        self.countdown.remaining()
    }

    pub fn preparation_remaining_secs(&self) -> u64 {
        self.preparation.remaining()
    }

    pub fn preparation_secs(&self) -> u64 {
        self.preparation_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_preparing(&self) -> bool {
        self.preparing
    }

    pub fn alert_pending(&self) -> bool {
        self.alert_pending
    }

    pub fn is_exhausted(&self) -> bool {
        !self.subjects.is_empty() && self.current_index >= self.subjects.len()
    }

    pub fn phase(&self) -> SequencePhase {
        if self.preparing {
            SequencePhase::Preparing
        } else if self.running {
            SequencePhase::Counting
        } else if self.is_exhausted() {
            SequencePhase::Exhausted
        } else {
            SequencePhase::Idle
        }
    }

    pub fn snapshot(&self) -> SequenceSnapshot {
        SequenceSnapshot {
            phase: self.phase(),
            subjects: self.subjects.clone(),
            current_index: self.current_index,
            current_subject: self.current_subject().map(|s| s.name.clone()),
            remaining_secs: self.remaining_secs(),
            preparation_remaining_secs: self.preparation_remaining_secs(),
            running: self.running,
            preparing: self.preparing,
            alert_pending: self.alert_pending,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Append a subject. Input is trusted; see [`super::SubjectInput`].
    pub fn add_subject(&mut self, subject: Subject) -> Option<Event> {
        let event = Event::SubjectAdded {
            index: self.subjects.len(),
            name: subject.name.clone(),
            duration_secs: subject.duration_secs,
            at: Utc::now(),
        };
        self.subjects.push(subject);
        Some(event)
    }

    pub fn start(&mut self) -> Option<Event> {
        if self.running || self.preparing {
            return None;
        }
        let duration = self.current_subject()?.duration_secs;
        if self.countdown.remaining() == 0 {
            self.countdown.arm(duration);
        }
        self.running = true;
        tracing::debug!(
            index = self.current_index,
            remaining_secs = self.countdown.remaining(),
            "subject countdown started"
        );
        Some(Event::SubjectStarted {
            index: self.current_index,
            name: self.subjects[self.current_index].name.clone(),
            remaining_secs: self.countdown.remaining(),
            at: Utc::now(),
        })
    }

    /// Halt the countdown, keeping what is left so `start` resumes it.
    ///
    /// During preparation this cancels the interstitial and moves onto the
    /// next subject without starting it.
    pub fn pause(&mut self) -> Option<Event> {
        if self.preparing {
            return self.cancel_preparation(true);
        }
        if !self.running {
            return None;
        }
        self.running = false;
        Some(Event::SubjectPaused {
            index: self.current_index,
            remaining_secs: self.countdown.remaining(),
            at: Utc::now(),
        })
    }

    /// Halt the countdown and discard it. The next `start` counts the
    /// current subject from its full duration.
    pub fn stop(&mut self) -> Option<Event> {
        if self.preparing {
            return self.cancel_preparation(false);
        }
        if !self.running && !self.countdown.is_armed() {
            return None;
        }
        self.running = false;
        self.countdown.clear();
        Some(Event::SubjectStopped {
            index: self.current_index,
            at: Utc::now(),
        })
    }

    /// Skip ahead. Shares the exact path taken when a countdown expires,
    /// minus the alert.
    pub fn next_subject(&mut self) -> Option<Event> {
        if self.preparing || self.current_index >= self.subjects.len() {
            return None;
        }
        Some(self.begin_preparation())
    }

    /// Stop everything and rewind to the first subject. Subjects are kept.
    pub fn reset(&mut self) -> Option<Event> {
        self.running = false;
        self.preparing = false;
        self.countdown.clear();
        self.preparation.clear();
        self.current_index = 0;
        self.alert_pending = false;
        Some(Event::SequenceReset { at: Utc::now() })
    }

    /// Consume the one-shot alert. Returns whether it was set.
    pub fn acknowledge_alert(&mut self) -> bool {
        std::mem::take(&mut self.alert_pending)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn begin_preparation(&mut self) -> Event {
        self.running = false;
        self.countdown.clear();
        self.preparing = true;
        self.preparation.arm(self.preparation_secs);
        tracing::debug!(
            from_index = self.current_index,
            preparation_secs = self.preparation_secs,
            "preparation started"
        );
        Event::PreparationStarted {
            from_index: self.current_index,
            preparation_secs: self.preparation_secs,
            at: Utc::now(),
        }
    }

    /// Leaves `preparing`, moves the index and arms the next countdown.
    /// Returns the events produced, not including any auto-start.
    fn advance_index(&mut self) -> Vec<Event> {
        self.preparing = false;
        self.preparation.clear();
        self.current_index += 1;

        match self.subjects.get(self.current_index) {
            Some(next) => {
                self.countdown.arm(next.duration_secs);
                vec![Event::SubjectAdvanced {
                    index: self.current_index,
                    at: Utc::now(),
                }]
            }
            None => {
                self.countdown.clear();
                tracing::info!(subjects = self.subjects.len(), "sequence exhausted");
                vec![Event::SequenceExhausted {
                    subject_count: self.subjects.len(),
                    at: Utc::now(),
                }]
            }
        }
    }

    fn finish_preparation(&mut self) -> Vec<Event> {
        let mut events = self.advance_index();
        if self.auto_continue {
            events.extend(self.start());
        }
        events
    }

    fn cancel_preparation(&mut self, keep_countdown: bool) -> Option<Event> {
        let events = self.advance_index();
        if !keep_countdown {
            self.countdown.clear();
        }
        events.into_iter().next()
    }

    fn expire_current(&mut self) -> Vec<Event> {
        self.alert_pending = true;
        let name = self
            .current_subject()
            .map(|s| s.name.clone())
            .unwrap_or_default();
        tracing::info!(index = self.current_index, subject = %name, "subject time is up");
        vec![
            Event::SubjectExpired {
                index: self.current_index,
                name,
                at: Utc::now(),
            },
            self.begin_preparation(),
        ]
    }
}

impl TickMachine for SequenceTimer {
    type Snapshot = SequenceSnapshot;

    fn tick(&mut self) -> Vec<Event> {
        if self.preparing {
            return match self.preparation.tick() {
                CountdownTick::Expired => self.finish_preparation(),
                CountdownTick::Running(_) | CountdownTick::Idle => Vec::new(),
            };
        }
        if !self.running {
            return Vec::new();
        }
        match self.countdown.tick() {
            CountdownTick::Expired => self.expire_current(),
            CountdownTick::Running(_) | CountdownTick::Idle => Vec::new(),
        }
    }

    fn clock(&self) -> Option<ClockSource> {
        if self.preparing {
            Some(ClockSource::Preparation)
        } else if self.running {
            Some(ClockSource::Countdown)
        } else {
            None
        }
    }

    fn snapshot(&self) -> SequenceSnapshot {
        SequenceTimer::snapshot(self)
    }
}
