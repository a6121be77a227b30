//! Read models derived from the habit collection for the home screen: the
//! daily progress header and the scrollable week rows of each habit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::Calendar;
use crate::habit::{Habit, HabitId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NextHabit {
    pub id: HabitId,
    pub name: String,
    pub icon: String,
}

/// How many habits are done on `date`, and which one comes next.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub completed: usize,
    pub total: usize,
    /// First habit in display order still open on `date`.
    pub next_habit: Option<NextHabit>,
}

impl DailySummary {
    pub fn from_habits(habits: &[Habit], date: NaiveDate) -> Self {
        let completed = habits.iter().filter(|h| h.is_completed(date)).count();
        let next_habit = habits
            .iter()
            .find(|h| !h.is_completed(date))
            .map(|h| NextHabit {
                id: h.id,
                name: h.name.clone(),
                icon: h.icon.clone(),
            });
        Self {
            date,
            completed,
            total: habits.len(),
            next_habit,
        }
    }

    pub fn uncompleted(&self) -> usize {
        self.total.saturating_sub(self.completed)
    }

    /// Share of habits completed, `0.0` when there are none.
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64
    }

    pub fn encouragement(&self) -> Encouragement {
        Encouragement::for_progress(self.progress())
    }

    pub fn all_done(&self) -> bool {
        self.total > 0 && self.next_habit.is_none()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Encouragement {
    AllDone,
    AlmostThere,
    KeepItUp,
}

impl Encouragement {
    pub fn for_progress(progress: f64) -> Self {
        if progress >= 1.0 {
            Encouragement::AllDone
        } else if progress >= 0.75 {
            Encouragement::AlmostThere
        } else {
            Encouragement::KeepItUp
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Encouragement::AllDone => "All done!",
            Encouragement::AlmostThere => "Almost there!",
            Encouragement::KeepItUp => "Keep it up!",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub day_number: u32,
    pub day_label: String,
    pub completed: bool,
    pub is_today: bool,
    /// False before the habit's creation date and after today.
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeekRow {
    pub week_start: NaiveDate,
    pub month_abbreviation: String,
    pub days: Vec<DayCell>,
}

pub fn week_row(habit: &Habit, calendar: &Calendar, week_start: NaiveDate) -> WeekRow {
    let today = calendar.today();
    let days = calendar
        .days_of_week(week_start)
        .into_iter()
        .map(|date| DayCell {
            date,
            day_number: calendar.day_number(date),
            day_label: calendar.day_label(date),
            completed: habit.is_completed(date),
            is_today: date == today,
            enabled: habit.is_day_enabled(date, today),
        })
        .collect();
    let week_start = calendar.start_of_week(week_start);
    WeekRow {
        week_start,
        month_abbreviation: calendar.month_abbreviation(week_start),
        days,
    }
}

/// One row per week from the habit's creation week through the current week.
pub fn week_rows(habit: &Habit, calendar: &Calendar) -> Vec<WeekRow> {
    calendar
        .week_start_dates(habit.creation_date, calendar.today())
        .into_iter()
        .map(|start| week_row(habit, calendar, start))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Locale;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn summary_counts_and_next_habit() {
        let today = date(2025, 10, 22);
        let mut water = Habit::new("Water", "drop", today);
        let read = Habit::new("Read", "book", today);
        water.toggle(today);

        let summary = DailySummary::from_habits(&[water, read.clone()], today);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.uncompleted(), 1);
        assert_eq!(summary.progress(), 0.5);
        assert_eq!(summary.encouragement(), Encouragement::KeepItUp);
        assert_eq!(summary.next_habit.map(|next| next.id), Some(read.id));
    }

    #[test]
    fn empty_collection_has_zero_progress() {
        let summary = DailySummary::from_habits(&[], date(2025, 10, 22));
        assert_eq!(summary.progress(), 0.0);
        assert!(!summary.all_done());
        assert!(summary.next_habit.is_none());
    }

    #[test]
    fn week_row_named_after_its_start() {
        // The week of Wednesday 2025-10-01 starts on Monday 2025-09-29.
        let calendar = Calendar::fixed(date(2025, 10, 22), Locale::en_gb());
        let habit = Habit::new("Walk", "figure.walk", date(2025, 9, 1));
        let row = week_row(&habit, &calendar, date(2025, 10, 1));
        assert_eq!(row.week_start, date(2025, 9, 29));
        assert_eq!(row.month_abbreviation, "Sep");
    }

    #[test]
    fn uncompleted_never_underflows() {
        let summary = DailySummary {
            date: date(2025, 10, 22),
            completed: 3,
            total: 2,
            next_habit: None,
        };
        assert_eq!(summary.uncompleted(), 0);
    }

    #[test]
    fn encouragement_thresholds() {
        assert_eq!(Encouragement::for_progress(1.0), Encouragement::AllDone);
        assert_eq!(Encouragement::for_progress(0.75), Encouragement::AlmostThere);
        assert_eq!(Encouragement::for_progress(0.74), Encouragement::KeepItUp);
    }

    #[test]
    fn week_rows_mark_today_and_disabled_days() {
        // Wednesday, Monday-start weeks.
        let today = date(2025, 10, 22);
        let calendar = Calendar::fixed(today, Locale::en_gb());
        let mut habit = Habit::new("Walk", "figure.walk", date(2025, 10, 14));
        habit.toggle(date(2025, 10, 15));

        let rows = week_rows(&habit, &calendar);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].week_start, date(2025, 10, 13));
        assert_eq!(rows[0].month_abbreviation, "Oct");

        let first = &rows[0].days;
        assert!(!first[0].enabled);
        assert!(first[1].enabled);
        assert!(first[2].completed);
        assert_eq!(first[0].day_label, "M");

        let current = &rows[1].days;
        assert!(current[2].is_today);
        assert!(current[2].enabled);
        assert!(!current[3].enabled);
        assert_eq!(current[6].day_number, 26);
    }
}
