//! Goal timer: a stopwatch with a focus-gated sub-counter.
//!
//! Like every engine in this crate it is a plain state machine. It never
//! spawns anything itself; one pulse of [`TickMachine::tick`] is one second
//! of study time. [`crate::timer::TimerDriver`] supplies the pulses.
//!
//! ```text
//! Paused --start--> Running --pause--> Paused
//!    ^                 |
//!    +-----reset-------+
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::driver::TickMachine;
use super::ticker::ClockSource;
use crate::events::Event;

/// Daily goal used when nothing else is configured.
pub const DEFAULT_GOAL_MINUTES: i64 = 120;

/// Read-only view of a [`GoalTimer`] for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalSnapshot {
    pub running: bool,
    pub focused: bool,
    pub total_secs: u64,
    pub focused_secs: u64,
    pub goal_secs: u64,
    /// 0.0 ..= 1.0
    pub progress: f64,
    pub remaining_secs: u64,
}

#[derive(Debug, Clone)]
pub struct GoalTimer {
    running: bool,
    focused: bool,
    total_secs: u64,
    /// Never exceeds `total_secs`: both advance on the same pulse.
    focused_secs: u64,
    goal_secs: u64,
    /// Set once `GoalReached` has been emitted for the current goal.
    goal_announced: bool,
}

impl Default for GoalTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl GoalTimer {
    pub fn new() -> Self {
        Self::with_goal_minutes(DEFAULT_GOAL_MINUTES)
    }

    pub fn with_goal_minutes(minutes: i64) -> Self {
        Self {
            running: false,
            focused: false,
            total_secs: 0,
            focused_secs: 0,
            goal_secs: minutes_to_secs(minutes),
            goal_announced: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    pub fn focused_secs(&self) -> u64 {
        self.focused_secs
    }

    pub fn goal_secs(&self) -> u64 {
        self.goal_secs
    }

    /// Focused time over goal, clamped to 0.0 ..= 1.0. Zero when no goal is set.
    pub fn progress(&self) -> f64 {
        if self.goal_secs == 0 {
            return 0.0;
        }
        (self.focused_secs as f64 / self.goal_secs as f64).clamp(0.0, 1.0)
    }

    /// Whole percent, truncated.
    pub fn progress_pct(&self) -> u8 {
        (self.progress() * 100.0) as u8
    }

    pub fn remaining_secs(&self) -> u64 {
        self.goal_secs.saturating_sub(self.focused_secs)
    }

    pub fn goal_reached(&self) -> bool {
        self.goal_secs > 0 && self.focused_secs >= self.goal_secs
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Negative minutes clamp to a zero goal. Allowed while running.
    pub fn set_goal_minutes(&mut self, minutes: i64) -> Option<Event> {
        self.goal_secs = minutes_to_secs(minutes);
        self.goal_announced = self.goal_reached();
        Some(Event::GoalChanged {
            goal_secs: self.goal_secs,
            at: Utc::now(),
        })
    }

    pub fn start(&mut self) -> Option<Event> {
        if self.running {
            return None;
        }
        self.running = true;
        tracing::debug!(total_secs = self.total_secs, "goal timer started");
        Some(Event::GoalStarted {
            total_secs: self.total_secs,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.running = false;
        tracing::debug!(total_secs = self.total_secs, "goal timer paused");
        Some(Event::GoalPaused {
            total_secs: self.total_secs,
            focused_secs: self.focused_secs,
            at: Utc::now(),
        })
    }

    pub fn toggle_running(&mut self) -> Option<Event> {
        if self.running {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Only affects future pulses; counters are untouched.
    pub fn toggle_focus(&mut self) -> Option<Event> {
        self.focused = !self.focused;
        Some(Event::FocusToggled {
            focused: self.focused,
            at: Utc::now(),
        })
    }

    /// Pause and clear both counters and the focus flag. The goal is kept.
    pub fn reset(&mut self) -> Option<Event> {
        self.pause();
        self.focused = false;
        self.total_secs = 0;
        self.focused_secs = 0;
        self.goal_announced = false;
        Some(Event::GoalReset { at: Utc::now() })
    }

    pub fn snapshot(&self) -> GoalSnapshot {
        GoalSnapshot {
            running: self.running,
            focused: self.focused,
            total_secs: self.total_secs,
            focused_secs: self.focused_secs,
            goal_secs: self.goal_secs,
            progress: self.progress(),
            remaining_secs: self.remaining_secs(),
        }
    }
}

impl TickMachine for GoalTimer {
    type Snapshot = GoalSnapshot;

    fn tick(&mut self) -> Vec<Event> {
        // A pulse that raced a pause is dropped here.
        if !self.running {
            return Vec::new();
        }
        self.total_secs = self.total_secs.saturating_add(1);
        if self.focused {
            self.focused_secs = self.focused_secs.saturating_add(1);
        }

        if !self.goal_announced && self.goal_reached() {
            self.goal_announced = true;
            tracing::info!(goal_secs = self.goal_secs, "daily goal reached");
            return vec![Event::GoalReached {
                goal_secs: self.goal_secs,
                at: Utc::now(),
            }];
        }
        Vec::new()
    }

    fn clock(&self) -> Option<ClockSource> {
        self.running.then_some(ClockSource::Stopwatch)
    }

    fn snapshot(&self) -> GoalSnapshot {
        GoalTimer::snapshot(self)
    }
}

fn minutes_to_secs(minutes: i64) -> u64 {
    (minutes.max(0) as u64).saturating_mul(60)
}
