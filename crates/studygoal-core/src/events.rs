use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every state change in an engine produces an Event.
/// The presentation layer renders snapshots; notifiers subscribe to events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    GoalStarted {
        total_secs: u64,
        at: DateTime<Utc>,
    },
    GoalPaused {
        total_secs: u64,
        focused_secs: u64,
        at: DateTime<Utc>,
    },
    GoalReset {
        at: DateTime<Utc>,
    },
    GoalChanged {
        goal_secs: u64,
        at: DateTime<Utc>,
    },
    FocusToggled {
        focused: bool,
        at: DateTime<Utc>,
    },
    /// Focused time reached a non-zero goal for the first time.
    GoalReached {
        goal_secs: u64,
        at: DateTime<Utc>,
    },
    SubjectAdded {
        index: usize,
        name: String,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    SubjectStarted {
        index: usize,
        name: String,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    SubjectPaused {
        index: usize,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    SubjectStopped {
        index: usize,
        at: DateTime<Utc>,
    },
    /// Countdown reached zero; the alert flag has been raised.
    SubjectExpired {
        index: usize,
        name: String,
        at: DateTime<Utc>,
    },
    PreparationStarted {
        from_index: usize,
        preparation_secs: u64,
        at: DateTime<Utc>,
    },
    SubjectAdvanced {
        index: usize,
        at: DateTime<Utc>,
    },
    SequenceExhausted {
        subject_count: usize,
        at: DateTime<Utc>,
    },
    SequenceReset {
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Snake-case name of the variant, handy for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::GoalStarted { .. } => "goal_started",
            Event::GoalPaused { .. } => "goal_paused",
            Event::GoalReset { .. } => "goal_reset",
            Event::GoalChanged { .. } => "goal_changed",
            Event::FocusToggled { .. } => "focus_toggled",
            Event::GoalReached { .. } => "goal_reached",
            Event::SubjectAdded { .. } => "subject_added",
            Event::SubjectStarted { .. } => "subject_started",
            Event::SubjectPaused { .. } => "subject_paused",
            Event::SubjectStopped { .. } => "subject_stopped",
            Event::SubjectExpired { .. } => "subject_expired",
            Event::PreparationStarted { .. } => "preparation_started",
            Event::SubjectAdvanced { .. } => "subject_advanced",
            Event::SequenceExhausted { .. } => "sequence_exhausted",
            Event::SequenceReset { .. } => "sequence_reset",
        }
    }
}
