use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a reminder; doubles as the notification identifier.
pub type ReminderId = Uuid;

/// Daily reminder attached to exactly one habit. Only the hour and minute of
/// `time` are meaningful.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reminder {
    pub id: ReminderId,
    pub enabled: bool,
    pub time: NaiveTime,
}

impl Reminder {
    pub fn new(time: NaiveTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            enabled: true,
            time: truncate_to_minute(time),
        }
    }

    pub fn hour(&self) -> u32 {
        self.time.hour()
    }

    pub fn minute(&self) -> u32 {
        self.time.minute()
    }
}

pub(crate) fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_reminder_drops_seconds() {
        let reminder = Reminder::new(NaiveTime::from_hms_milli_opt(7, 45, 31, 250).unwrap());
        assert!(reminder.enabled);
        assert_eq!((reminder.hour(), reminder.minute()), (7, 45));
        assert_eq!(reminder.time.second(), 0);
    }
}
