//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Daily goal
//! - Sequence behaviour (preparation gap, auto-continue)
//! - Ticker cadence
//! - Notification preferences
//! - Preset subjects for the sequencer
//!
//! Configuration is stored at `~/.config/studygoal/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::timer::{
    GoalDriver, GoalTimer, SequenceDriver, SequenceTimer, Subject, DEFAULT_GOAL_MINUTES,
    DEFAULT_PREPARATION_SECS,
};

/// Goal timer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalConfig {
    #[serde(default = "default_goal_minutes")]
    pub default_minutes: i64,
}

/// Sequence timer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceConfig {
    #[serde(default = "default_preparation_secs")]
    pub preparation_secs: u64,
    #[serde(default = "default_true")]
    pub auto_continue: bool,
}

/// Pulse cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Ring the terminal bell when a subject's time is up.
    #[serde(default = "default_true")]
    pub bell: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/studygoal/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub goal: GoalConfig,
    #[serde(default)]
    pub sequence: SequenceConfig,
    #[serde(default)]
    pub ticker: TickerConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    /// Subjects loaded into the sequencer when none are given on the command line.
    #[serde(default)]
    pub subjects: Vec<Subject>,
}

// Default functions
fn default_goal_minutes() -> i64 {
    DEFAULT_GOAL_MINUTES
}
fn default_preparation_secs() -> u64 {
    DEFAULT_PREPARATION_SECS
}
fn default_interval_ms() -> u64 {
    1000
}
fn default_true() -> bool {
    true
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            default_minutes: default_goal_minutes(),
        }
    }
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            preparation_secs: default_preparation_secs(),
            auto_continue: true,
        }
    }
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { bell: true }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            goal: GoalConfig::default(),
            sequence: SequenceConfig::default(),
            ticker: TickerConfig::default(),
            notifications: NotificationsConfig::default(),
            subjects: Vec::new(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    if let Ok(n) = value.parse::<u64>() {
                        serde_json::Value::Number(n.into())
                    } else if let Ok(n) = value.parse::<i64>() {
                        serde_json::Value::Number(n.into())
                    } else {
                        return Err(invalid(format!("cannot parse '{value}' as number")));
                    }
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default configuration");
            Self::default()
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value in memory by dot-separated key. Does not persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the
    /// field's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        Ok(())
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.ticker.interval_ms.max(1))
    }

    /// A goal timer preloaded with the configured goal.
    pub fn goal_timer(&self) -> GoalTimer {
        GoalTimer::with_goal_minutes(self.goal.default_minutes)
    }

    /// A sequence timer with the configured behaviour and preset subjects.
    pub fn sequence_timer(&self) -> SequenceTimer {
        let mut timer = SequenceTimer::new()
            .with_preparation_secs(self.sequence.preparation_secs)
            .with_auto_continue(self.sequence.auto_continue);
        for subject in &self.subjects {
            timer.add_subject(subject.clone());
        }
        timer
    }

    /// [`Self::goal_timer`] on a driver pulsing at the configured cadence.
    ///
    /// # Errors
    ///
    /// Fails when called outside a tokio runtime.
    pub fn goal_driver(&self) -> Result<GoalDriver> {
        Ok(GoalDriver::with_period(self.goal_timer(), self.tick_period())?)
    }

    /// [`Self::sequence_timer`] on a driver pulsing at the configured cadence.
    ///
    /// # Errors
    ///
    /// Fails when called outside a tokio runtime.
    pub fn sequence_driver(&self) -> Result<SequenceDriver> {
        Ok(SequenceDriver::with_period(
            self.sequence_timer(),
            self.tick_period(),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.goal.default_minutes, 120);
        assert_eq!(parsed.sequence.preparation_secs, 10);
        assert!(parsed.notifications.bell);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let parsed: Config = toml::from_str("[goal]\ndefault_minutes = 45\n").unwrap();
        assert_eq!(parsed.goal.default_minutes, 45);
        assert_eq!(parsed.ticker.interval_ms, 1000);
        assert!(parsed.sequence.auto_continue);
        assert!(parsed.subjects.is_empty());
    }

    #[test]
    fn subjects_parse_as_array_of_tables() {
        let parsed: Config = toml::from_str(
            r#"
[[subjects]]
name = "Math"
duration_secs = 1500

[[subjects]]
name = "English"
duration_secs = 1800
"#,
        )
        .unwrap();
        assert_eq!(parsed.subjects.len(), 2);
        let timer = parsed.sequence_timer();
        assert_eq!(timer.subjects()[1].name, "English");
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("goal.default_minutes").as_deref(), Some("120"));
        assert_eq!(cfg.get("notifications.bell").as_deref(), Some("true"));
        assert!(cfg.get("goal.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.set("sequence.preparation_secs", "5").unwrap();
        cfg.set("sequence.auto_continue", "false").unwrap();
        cfg.set("goal.default_minutes", "-30").unwrap();
        assert_eq!(cfg.sequence.preparation_secs, 5);
        assert!(!cfg.sequence.auto_continue);
        assert_eq!(cfg.goal.default_minutes, -30);
        // Negative goals clamp in the engine, not in config.
        assert_eq!(cfg.goal_timer().goal_secs(), 0);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("goal.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(cfg.set("", "1"), Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn set_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("notifications.bell", "loud"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set("sequence.preparation_secs", "-1"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn load_from_creates_defaults_then_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let created = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(created.goal.default_minutes, 120);

        let mut cfg = created;
        cfg.set("goal.default_minutes", "90").unwrap();
        cfg.subjects.push(Subject::new("Math", 25));
        cfg.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.goal.default_minutes, 90);
        assert_eq!(reloaded.subjects, vec![Subject::new("Math", 25)]);
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "goal = [not toml").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }

    #[test]
    fn drivers_need_a_runtime() {
        let cfg = Config::default();
        assert!(matches!(
            cfg.goal_driver(),
            Err(crate::CoreError::Timer(crate::TimerError::NoRuntime(_)))
        ));
        assert!(matches!(
            cfg.sequence_driver(),
            Err(crate::CoreError::Timer(_))
        ));
    }

    #[tokio::test]
    async fn sequence_driver_carries_configured_subjects() {
        let mut cfg = Config::default();
        cfg.subjects.push(Subject::new("Math", 25));
        cfg.set("sequence.auto_continue", "false").unwrap();
        let driver = cfg.sequence_driver().unwrap();
        let snap = driver.snapshot();
        assert_eq!(snap.subjects, vec![Subject::new("Math", 25)]);
        assert!(!snap.running);
        assert!(!driver.is_ticking());
    }

    #[test]
    fn tick_period_never_zero() {
        let mut cfg = Config::default();
        assert_eq!(cfg.tick_period(), Duration::from_secs(1));
        cfg.ticker.interval_ms = 0;
        assert_eq!(cfg.tick_period(), Duration::from_millis(1));
    }
}
