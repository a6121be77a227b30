use std::path::PathBuf;

use anyhow::Result;
use chrono::Weekday;
use tracing::{info, warn};

use crate::error::HabitError;
use crate::notifications::DEFAULT_REMINDER_TITLE;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HabitConfig {
    /// JSON store location. `None` keeps habits in memory only.
    pub store_path: Option<PathBuf>,
    /// Overrides the locale's week start.
    pub first_weekday: Option<Weekday>,
    pub reminder_title: String,
}

impl Default for HabitConfig {
    fn default() -> Self {
        Self {
            store_path: None,
            first_weekday: None,
            reminder_title: DEFAULT_REMINDER_TITLE.to_string(),
        }
    }
}

impl HabitConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source. Invalid values are
    /// logged and the default is kept.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(path) = lookup("HABIT_STORE_PATH") {
            let path = path.trim();
            if !path.is_empty() {
                info!(path, "using habit store");
                config.store_path = Some(PathBuf::from(path));
            }
        }
        if let Some(value) = lookup("HABIT_FIRST_WEEKDAY") {
            match parse_weekday(&value) {
                Ok(weekday) => config.first_weekday = Some(weekday),
                Err(err) => warn!(%err, "ignoring HABIT_FIRST_WEEKDAY"),
            }
        }
        if let Some(title) = lookup("HABIT_REMINDER_TITLE") {
            let title = title.trim();
            if !title.is_empty() {
                config.reminder_title = title.to_string();
            }
        }
        Ok(config)
    }
}

fn parse_weekday(value: &str) -> Result<Weekday, HabitError> {
    value
        .trim()
        .parse::<Weekday>()
        .map_err(|_| HabitError::Config(format!("unknown weekday {value:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_variables() {
        let config = HabitConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, HabitConfig::default());
        assert_eq!(config.reminder_title, "Habit Reminder");
    }

    #[test]
    fn reads_all_variables() {
        let config = HabitConfig::from_lookup(lookup(&[
            ("HABIT_STORE_PATH", "/tmp/habits.json"),
            ("HABIT_FIRST_WEEKDAY", "Mon"),
            ("HABIT_REMINDER_TITLE", "Time to check in"),
        ]))
        .unwrap();
        assert_eq!(config.store_path, Some(PathBuf::from("/tmp/habits.json")));
        assert_eq!(config.first_weekday, Some(Weekday::Mon));
        assert_eq!(config.reminder_title, "Time to check in");
    }

    #[test]
    fn invalid_weekday_keeps_default() {
        let config =
            HabitConfig::from_lookup(lookup(&[("HABIT_FIRST_WEEKDAY", "someday")])).unwrap();
        assert_eq!(config.first_weekday, None);
    }
}
