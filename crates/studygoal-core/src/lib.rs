//! # StudyGoal Core Library
//!
//! Core logic for a personal study-time tracker. All state lives here; front
//! ends (the bundled CLI, or anything else) issue commands and render the
//! snapshots the engines publish.
//!
//! ## Architecture
//!
//! - **Engines**: plain state machines advanced one second per `tick()`.
//!   [`GoalTimer`] accumulates total and focused time against a daily goal;
//!   [`SequenceTimer`] counts down named subjects with a preparation gap
//!   between them and raises a one-shot alert on each expiry.
//! - **Driver**: [`TimerDriver`] owns an engine plus a tokio-backed
//!   [`Ticker`], serializes every mutation and publishes snapshots and
//!   [`Event`]s over channels.
//! - **Storage**: TOML configuration under `~/.config/studygoal/`.

pub mod error;
pub mod events;
pub mod format;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, TimerError, ValidationError};
pub use events::Event;
pub use format::{format_duration, goal_message};
pub use storage::Config;
pub use timer::{
    ClockSource, GoalDriver, GoalSnapshot, GoalTimer, SequenceDriver, SequencePhase,
    SequenceSnapshot, SequenceTimer, Subject, SubjectInput, TickMachine, Ticker, TimerDriver,
};
