mod countdown;
mod driver;
mod goal;
mod sequence;
mod subject;
mod ticker;

pub use countdown::{Countdown, CountdownTick};
pub use driver::{GoalDriver, SequenceDriver, TickMachine, TimerDriver};
pub use goal::{GoalSnapshot, GoalTimer, DEFAULT_GOAL_MINUTES};
pub use sequence::{SequencePhase, SequenceSnapshot, SequenceTimer, DEFAULT_PREPARATION_SECS};
pub use subject::{Subject, SubjectInput};
pub use ticker::{ClockSource, Ticker, DEFAULT_TICK_PERIOD};
