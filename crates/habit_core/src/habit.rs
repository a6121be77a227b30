use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::calendar::Calendar;
use crate::error::HabitError;
use crate::notifications::{DailyNotification, NotificationSink};
use crate::reminder::{truncate_to_minute, Reminder};

pub type HabitId = Uuid;

pub const DEFAULT_ICON: &str = "star";

/// Icon keys a habit may carry.
pub const ICON_OPTIONS: [&str; 15] = [
    "star",
    "flame",
    "leaf",
    "drop",
    "bolt",
    "heart",
    "gift",
    "figure.walk",
    "book",
    "music.note",
    "moon",
    "sun.max",
    "cup.and.saucer",
    "laptopcomputer",
    "brain.head.profile",
];

/// Completion record of one habit on one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HabitLog {
    pub habit_id: HabitId,
    pub date: NaiveDate,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    pub icon: String,
    pub creation_date: NaiveDate,
    #[serde(default)]
    logs: Vec<HabitLog>,
    #[serde(default)]
    reminder: Option<Reminder>,
    #[serde(skip)]
    inserted: bool,
}

impl Habit {
    pub fn new(name: impl Into<String>, icon: impl Into<String>, creation_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            icon: icon.into(),
            creation_date,
            logs: Vec::new(),
            reminder: None,
            inserted: false,
        }
    }

    pub fn logs(&self) -> &[HabitLog] {
        &self.logs
    }

    pub fn reminder(&self) -> Option<&Reminder> {
        self.reminder.as_ref()
    }

    pub fn is_inserted(&self) -> bool {
        self.inserted
    }

    pub(crate) fn mark_inserted(&mut self) {
        self.inserted = true;
    }

    /// True when a completed log exists for `date`. Never creates a log.
    pub fn is_completed(&self, date: NaiveDate) -> bool {
        self.logs
            .iter()
            .any(|log| log.date == date && log.completed)
    }

    pub fn find_log(&self, date: NaiveDate) -> Option<&HabitLog> {
        self.logs.iter().find(|log| log.date == date)
    }

    /// Registers a not-yet-completed log for `date`. A day keeps at most one
    /// log, so an existing entry is returned unchanged.
    pub fn create_log(&mut self, date: NaiveDate) -> &mut HabitLog {
        let index = match self.logs.iter().position(|log| log.date == date) {
            Some(index) => index,
            None => {
                self.logs.push(HabitLog {
                    habit_id: self.id,
                    date,
                    completed: false,
                });
                self.logs.len() - 1
            }
        };
        &mut self.logs[index]
    }

    /// Get-or-create entry point for changing the completion state of a day.
    pub fn log_for_date(&mut self, date: NaiveDate) -> &mut HabitLog {
        self.create_log(date)
    }

    /// Flips the completion state of `date` and returns the new state.
    pub fn toggle(&mut self, date: NaiveDate) -> bool {
        let log = self.log_for_date(date);
        log.completed = !log.completed;
        log.completed
    }

    /// Days before the habit existed and days after today cannot be toggled.
    pub fn is_day_enabled(&self, date: NaiveDate, today: NaiveDate) -> bool {
        self.creation_date <= date && date <= today
    }

    /// Folds logs sharing a calendar day into one (completed if any was) and
    /// points every log back at this habit. Returns how many were merged away.
    pub(crate) fn repair_logs(&mut self) -> usize {
        let before = self.logs.len();
        let mut kept: Vec<HabitLog> = Vec::with_capacity(before);
        for mut log in std::mem::take(&mut self.logs) {
            log.habit_id = self.id;
            match kept.iter_mut().find(|existing| existing.date == log.date) {
                Some(existing) => existing.completed |= log.completed,
                None => kept.push(log),
            }
        }
        self.logs = kept;
        before - self.logs.len()
    }

    /// Copies the fields an edit form can change from `other`; logs and the
    /// reminder stay as they are.
    pub(crate) fn merge_editable(&mut self, other: Habit) {
        self.name = other.name;
        self.icon = other.icon;
        self.creation_date = other.creation_date;
    }

    pub fn clear_logs(&mut self) -> usize {
        let removed = self.logs.len();
        self.logs.clear();
        removed
    }

    /// Consecutive completed days ending today, or ending yesterday while
    /// today is still open.
    pub fn current_streak(&self, today: NaiveDate) -> u32 {
        let mut day = if self.is_completed(today) {
            today
        } else {
            match today.pred_opt() {
                Some(yesterday) => yesterday,
                None => return 0,
            }
        };
        let mut streak = 0;
        while self.is_completed(day) {
            streak += 1;
            match day.pred_opt() {
                Some(previous) => day = previous,
                None => break,
            }
        }
        streak
    }

    pub fn longest_streak(&self) -> u32 {
        let mut days: Vec<NaiveDate> = self
            .logs
            .iter()
            .filter(|log| log.completed)
            .map(|log| log.date)
            .collect();
        days.sort();
        let mut longest = 0;
        let mut run = 0;
        let mut previous: Option<NaiveDate> = None;
        for day in days {
            run = match previous {
                Some(prev) if prev.succ_opt() == Some(day) => run + 1,
                _ => 1,
            };
            longest = longest.max(run);
            previous = Some(day);
        }
        longest
    }

    pub fn completed_days_in_week(&self, calendar: &Calendar, date: NaiveDate) -> usize {
        calendar
            .days_of_week(date)
            .iter()
            .filter(|day| self.is_completed(**day))
            .count()
    }

    /// Enables, updates or removes the daily reminder. Disabling cancels the
    /// pending notification before the reminder is dropped.
    pub fn set_reminder(
        &mut self,
        enabled: bool,
        time: NaiveTime,
        sink: &dyn NotificationSink,
        title: &str,
    ) {
        if enabled {
            let time = truncate_to_minute(time);
            match self.reminder.as_mut() {
                Some(reminder) => {
                    reminder.time = time;
                    reminder.enabled = true;
                }
                None => self.reminder = Some(Reminder::new(time)),
            }
            self.schedule_reminder(sink, title);
        } else if let Some(reminder) = self.reminder.take() {
            sink.cancel(reminder.id);
            debug!(habit = %self.name, reminder = %reminder.id, "reminder removed");
        }
    }

    /// Returns whether the sink accepted the notification.
    pub(crate) fn schedule_reminder(&self, sink: &dyn NotificationSink, title: &str) -> bool {
        let Some(reminder) = self.reminder.as_ref().filter(|reminder| reminder.enabled) else {
            return false;
        };
        let notification = DailyNotification {
            id: reminder.id,
            hour: reminder.hour(),
            minute: reminder.minute(),
            title: title.to_string(),
            subtitle: self.name.clone(),
        };
        match sink.schedule_daily(notification) {
            Ok(()) => {
                debug!(
                    habit = %self.name,
                    hour = reminder.hour(),
                    minute = reminder.minute(),
                    "reminder scheduled"
                );
                true
            }
            Err(err) => {
                warn!(habit = %self.name, %err, "reminder kept but not scheduled");
                false
            }
        }
    }

    pub(crate) fn cancel_reminder(&self, sink: &dyn NotificationSink) {
        if let Some(reminder) = &self.reminder {
            sink.cancel(reminder.id);
        }
    }

    /// Copies the edited fields onto the habit. The reminder is left to
    /// `set_reminder`, which needs a notification sink.
    pub fn apply_draft(&mut self, draft: &HabitDraft, today: NaiveDate) -> Result<(), HabitError> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(HabitError::EmptyName);
        }
        if draft.creation_date > today {
            return Err(HabitError::CreationDateInFuture {
                date: draft.creation_date,
                today,
            });
        }
        self.name = name.to_string();
        self.icon = if ICON_OPTIONS.contains(&draft.icon.as_str()) {
            draft.icon.clone()
        } else {
            debug!(icon = %draft.icon, "unknown icon replaced with default");
            DEFAULT_ICON.to_string()
        };
        self.creation_date = draft.creation_date;
        Ok(())
    }
}

/// Editable copy of a habit's fields, as held by an edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitDraft {
    pub name: String,
    pub icon: String,
    pub creation_date: NaiveDate,
    pub reminder_enabled: bool,
    pub reminder_time: NaiveTime,
}

impl HabitDraft {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            name: String::new(),
            icon: DEFAULT_ICON.to_string(),
            creation_date: today,
            reminder_enabled: false,
            reminder_time: default_reminder_time(),
        }
    }

    pub fn for_habit(habit: &Habit) -> Self {
        Self {
            name: habit.name.clone(),
            icon: habit.icon.clone(),
            creation_date: habit.creation_date,
            reminder_enabled: habit.reminder.as_ref().is_some_and(|r| r.enabled),
            reminder_time: habit
                .reminder
                .as_ref()
                .map(|r| r.time)
                .unwrap_or_else(default_reminder_time),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_reminder(mut self, time: NaiveTime) -> Self {
        self.reminder_enabled = true;
        self.reminder_time = time;
        self
    }

    /// Whether the save action should be offered.
    pub fn can_save(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

fn default_reminder_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
}
