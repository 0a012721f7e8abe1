use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A named block of study time in a sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    /// Duration in seconds.
    pub duration_secs: u64,
}

impl Subject {
    /// Build a subject from whole minutes without validating.
    ///
    /// Uses saturating arithmetic so absurd minute counts cannot overflow.
    /// Zero minutes is accepted and expires on the first tick.
    pub fn new(name: impl Into<String>, minutes: u64) -> Self {
        Self {
            name: name.into(),
            duration_secs: minutes.saturating_mul(60),
        }
    }

    pub fn duration_min(&self) -> u64 {
        self.duration_secs / 60
    }
}

/// Caller-side validation for raw subject input.
pub struct SubjectInput;

impl SubjectInput {
    /// Turn a name and a minutes text field into a [`Subject`].
    ///
    /// Rejects blank names and minutes that are not a positive integer.
    pub fn validate(name: &str, minutes: &str) -> Result<Subject, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::BlankName);
        }
        let minutes = minutes.trim();
        let parsed: i64 = minutes
            .parse()
            .map_err(|_| ValidationError::NotANumber(minutes.to_string()))?;
        if parsed <= 0 {
            return Err(ValidationError::NonPositive(parsed));
        }
        Ok(Subject::new(name, parsed as u64))
    }
}

/// Parses `"Name:minutes"`. The last colon splits, so names may contain colons.
impl FromStr for Subject {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, minutes) = s
            .rsplit_once(':')
            .ok_or_else(|| ValidationError::Malformed(s.to_string()))?;
        SubjectInput::validate(name, minutes)
    }
}
