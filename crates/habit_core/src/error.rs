use chrono::NaiveDate;
use thiserror::Error;

use crate::habit::HabitId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HabitError {
    #[error("habit name must not be empty")]
    EmptyName,
    #[error("creation date {date} is later than today ({today})")]
    CreationDateInFuture { date: NaiveDate, today: NaiveDate },
    #[error("habit {0} not found")]
    NotFound(HabitId),
    #[error("{date} is outside the editable range of the habit")]
    DayNotEditable { date: NaiveDate },
    #[error("invalid configuration: {0}")]
    Config(String),
}
