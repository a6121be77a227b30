use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::{
    calendar::{Calendar, CalendarProvider, Locale, SystemCalendar},
    config::HabitConfig,
    error::HabitError,
    habit::{Habit, HabitDraft, HabitId, DEFAULT_ICON},
    notifications::{DeferredSink, NoopSink, NotificationSink},
    overview::{self, DailySummary, WeekRow},
    store::{HabitStore, JsonFileStore, MemoryStore},
};

/// The collection of all habits. Every mutation is applied to a copy of the
/// collection; the copy replaces the live one only once the store has saved
/// it, and notification calls go out after that.
pub struct HabitService {
    habits: RwLock<Vec<Habit>>,
    store: Box<dyn HabitStore>,
    notification_sink: Box<dyn NotificationSink>,
    calendar: Calendar,
    reminder_title: String,
}

pub struct HabitServiceBuilder {
    store: Option<Box<dyn HabitStore>>,
    notification_sink: Option<Box<dyn NotificationSink>>,
    calendar: Option<Calendar>,
    config: HabitConfig,
}

impl HabitServiceBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            notification_sink: None,
            calendar: None,
            config: HabitConfig::default(),
        }
    }

    /// Store and calendar settings from `config` apply only when no explicit
    /// store or calendar is given.
    pub fn with_config(mut self, config: HabitConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_store(mut self, store: Box<dyn HabitStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_notification_sink(mut self, sink: Box<dyn NotificationSink>) -> Self {
        self.notification_sink = Some(sink);
        self
    }

    pub fn with_calendar(mut self, calendar: Calendar) -> Self {
        self.calendar = Some(calendar);
        self
    }

    pub fn with_calendar_provider(self, provider: Arc<dyn CalendarProvider>) -> Self {
        self.with_calendar(Calendar::new(provider))
    }

    pub fn build(self) -> Result<HabitService> {
        let HabitServiceBuilder {
            store,
            notification_sink,
            calendar,
            config,
        } = self;

        let store: Box<dyn HabitStore> = match (store, &config.store_path) {
            (Some(store), _) => store,
            (None, Some(path)) => Box::new(JsonFileStore::new(path)),
            (None, None) => Box::new(MemoryStore::new()),
        };
        let notification_sink: Box<dyn NotificationSink> = match notification_sink {
            Some(sink) => sink,
            None => Box::new(NoopSink),
        };
        let calendar = calendar.unwrap_or_else(|| {
            let mut locale = Locale::default();
            if let Some(first) = config.first_weekday {
                locale = locale.with_first_weekday(first);
            }
            Calendar::new(Arc::new(SystemCalendar::new(locale)))
        });

        let mut habits = store.load().context("loading habits")?;
        for habit in &mut habits {
            habit.mark_inserted();
            let merged = habit.repair_logs();
            if merged > 0 {
                warn!(habit = %habit.id, merged, "merged duplicate day logs");
            }
        }
        info!(count = habits.len(), "habits loaded");

        Ok(HabitService {
            habits: RwLock::new(habits),
            store,
            notification_sink,
            calendar,
            reminder_title: config.reminder_title,
        })
    }
}

impl Default for HabitServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HabitService {
    pub fn builder() -> HabitServiceBuilder {
        HabitServiceBuilder::new()
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn today(&self) -> NaiveDate {
        self.calendar.today()
    }

    /// All habits, newest creation date first.
    pub fn habits(&self) -> Vec<Habit> {
        let mut habits = self.habits.read().clone();
        habits.sort_by(|a, b| b.creation_date.cmp(&a.creation_date));
        habits
    }

    pub fn len(&self) -> usize {
        self.habits.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.habits.read().is_empty()
    }

    pub fn get(&self, id: HabitId) -> Result<Habit> {
        self.habits
            .read()
            .iter()
            .find(|habit| habit.id == id)
            .cloned()
            .ok_or_else(|| HabitError::NotFound(id).into())
    }

    /// Inserts `habit`. When a habit with the same id is already stored only
    /// its name, icon and creation date are updated; logs and the reminder
    /// change through their own operations.
    pub fn add(&self, mut habit: Habit) -> Result<HabitId> {
        self.validate(&mut habit)?;
        let id = habit.id;
        self.commit(|habits, _| {
            match habits.iter_mut().find(|existing| existing.id == id) {
                Some(existing) => {
                    debug!(%id, was_inserted = habit.is_inserted(), "habit updated");
                    existing.merge_editable(habit);
                }
                None => {
                    info!(%id, name = %habit.name, "habit added");
                    habit.mark_inserted();
                    habits.push(habit);
                }
            }
            Ok(id)
        })
    }

    /// Creates a habit from an edit form, including its reminder.
    pub fn create(&self, draft: &HabitDraft) -> Result<HabitId> {
        let today = self.today();
        let mut habit = Habit::new(String::new(), DEFAULT_ICON, today);
        habit.apply_draft(draft, today)?;
        let id = habit.id;
        self.commit(|habits, sink| {
            self.update_reminder(&mut habit, draft.reminder_enabled, draft.reminder_time, sink);
            info!(%id, name = %habit.name, "habit added");
            habit.mark_inserted();
            habits.push(habit);
            Ok(id)
        })
    }

    pub fn edit(&self, id: HabitId, draft: &HabitDraft) -> Result<()> {
        let today = self.today();
        self.with_habit_mut(id, |habit, sink| {
            habit.apply_draft(draft, today)?;
            self.update_reminder(habit, draft.reminder_enabled, draft.reminder_time, sink);
            Ok(())
        })
    }

    pub fn set_reminder(&self, id: HabitId, enabled: bool, time: NaiveTime) -> Result<()> {
        self.with_habit_mut(id, |habit, sink| {
            self.update_reminder(habit, enabled, time, sink);
            Ok(())
        })
    }

    /// Removes the habit together with its logs and reminder. A pending
    /// notification is cancelled once the removal is saved.
    pub fn delete(&self, id: HabitId) -> Result<()> {
        let removed = self.commit(|habits, sink| {
            let index = habits
                .iter()
                .position(|habit| habit.id == id)
                .ok_or(HabitError::NotFound(id))?;
            habits[index].cancel_reminder(sink);
            Ok(habits.remove(index))
        })?;
        info!(%id, logs = removed.logs().len(), "habit deleted");
        Ok(())
    }

    /// Drops every log of the habit; the habit and its reminder stay.
    pub fn reset_progress(&self, id: HabitId) -> Result<usize> {
        let removed = self.with_habit_mut(id, |habit, _| Ok(habit.clear_logs()))?;
        info!(%id, removed, "habit progress reset");
        Ok(removed)
    }

    /// Flips completion for `date`; only days from the creation date through
    /// today can change.
    pub fn toggle_completion(&self, id: HabitId, date: NaiveDate) -> Result<bool> {
        let today = self.today();
        self.with_habit_mut(id, |habit, _| {
            if !habit.is_day_enabled(date, today) {
                return Err(HabitError::DayNotEditable { date }.into());
            }
            let completed = habit.toggle(date);
            debug!(%id, %date, completed, "completion toggled");
            Ok(completed)
        })
    }

    pub fn is_completed(&self, id: HabitId, date: NaiveDate) -> Result<bool> {
        self.habits
            .read()
            .iter()
            .find(|habit| habit.id == id)
            .map(|habit| habit.is_completed(date))
            .ok_or_else(|| HabitError::NotFound(id).into())
    }

    pub fn daily_summary(&self) -> DailySummary {
        DailySummary::from_habits(&self.habits(), self.today())
    }

    pub fn week_rows(&self, id: HabitId) -> Result<Vec<WeekRow>> {
        let habit = self.get(id)?;
        Ok(overview::week_rows(&habit, &self.calendar))
    }

    /// Schedules every enabled reminder again, e.g. once permission is
    /// granted. Returns how many the sink accepted.
    pub fn reschedule_reminders(&self) -> usize {
        let habits = self.habits.read();
        let scheduled = habits
            .iter()
            .filter(|habit| {
                habit.schedule_reminder(self.notification_sink.as_ref(), &self.reminder_title)
            })
            .count();
        debug!(scheduled, "reminders rescheduled");
        scheduled
    }

    pub fn persist(&self) -> Result<()> {
        let habits = self.habits.read();
        self.store.persist(&habits).context("saving habits")
    }
}

impl HabitService {
    fn validate(&self, habit: &mut Habit) -> Result<()> {
        let today = self.today();
        habit.name = habit.name.trim().to_string();
        if habit.name.is_empty() {
            return Err(HabitError::EmptyName.into());
        }
        if habit.creation_date > today {
            return Err(HabitError::CreationDateInFuture {
                date: habit.creation_date,
                today,
            }
            .into());
        }
        Ok(())
    }

    /// Applies `change` to a copy of the collection and saves the copy. On
    /// success the copy becomes live and the held-back notification calls are
    /// sent; on any error the collection and the sink are left untouched.
    fn commit<T>(
        &self,
        change: impl FnOnce(&mut Vec<Habit>, &dyn NotificationSink) -> Result<T>,
    ) -> Result<T> {
        let mut habits = self.habits.write();
        let mut candidate = habits.clone();
        let pending = DeferredSink::default();
        let value = change(&mut candidate, &pending)?;
        self.store.persist(&candidate).context("saving habits")?;
        *habits = candidate;
        drop(habits);
        pending.flush(self.notification_sink.as_ref());
        Ok(value)
    }

    fn with_habit_mut<T>(
        &self,
        id: HabitId,
        apply: impl FnOnce(&mut Habit, &dyn NotificationSink) -> Result<T>,
    ) -> Result<T> {
        self.commit(|habits, sink| {
            let habit = habits
                .iter_mut()
                .find(|habit| habit.id == id)
                .ok_or(HabitError::NotFound(id))?;
            apply(habit, sink)
        })
    }

    /// Authorization is asked of the live sink straight away; schedule and
    /// cancel calls go to `sink`.
    fn update_reminder(
        &self,
        habit: &mut Habit,
        enabled: bool,
        time: NaiveTime,
        sink: &dyn NotificationSink,
    ) {
        if enabled && habit.reminder().is_none() {
            if let Err(err) = self.notification_sink.request_authorization() {
                warn!(habit = %habit.name, %err, "notification authorization not granted");
            }
        }
        habit.set_reminder(enabled, time, sink, &self.reminder_title);
    }
}
