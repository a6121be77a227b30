use std::sync::Arc;

use chrono::{Datelike, Days, Local, NaiveDate, Weekday};

/// Weekday and month naming plus the week-start convention of a locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    first_weekday: Weekday,
    /// Indexed by `Weekday::num_days_from_sunday`.
    weekday_symbols: [String; 7],
    /// Indexed by `Datelike::month0`.
    month_symbols: [String; 12],
}

impl Locale {
    pub fn new(
        first_weekday: Weekday,
        weekday_symbols: [&str; 7],
        month_symbols: [&str; 12],
    ) -> Self {
        Self {
            first_weekday,
            weekday_symbols: weekday_symbols.map(str::to_string),
            month_symbols: month_symbols.map(str::to_string),
        }
    }

    pub fn en_us() -> Self {
        Self::new(Weekday::Sun, ENGLISH_WEEKDAYS, ENGLISH_MONTHS)
    }

    pub fn en_gb() -> Self {
        Self::new(Weekday::Mon, ENGLISH_WEEKDAYS, ENGLISH_MONTHS)
    }

    pub fn with_first_weekday(mut self, first_weekday: Weekday) -> Self {
        self.first_weekday = first_weekday;
        self
    }

    pub fn first_weekday(&self) -> Weekday {
        self.first_weekday
    }

    pub fn short_weekday_symbol(&self, weekday: Weekday) -> &str {
        &self.weekday_symbols[weekday.num_days_from_sunday() as usize]
    }

    pub fn short_month_symbol(&self, date: NaiveDate) -> &str {
        &self.month_symbols[date.month0() as usize]
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::en_us()
    }
}

const ENGLISH_WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const ENGLISH_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Supplies "today" and the active locale. Injected so tests can pin the date.
pub trait CalendarProvider: Send + Sync {
    fn today(&self) -> NaiveDate;
    fn locale(&self) -> &Locale;
}

/// Reads today from the local wall clock.
#[derive(Debug, Clone, Default)]
pub struct SystemCalendar {
    locale: Locale,
}

impl SystemCalendar {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }
}

impl CalendarProvider for SystemCalendar {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn locale(&self) -> &Locale {
        &self.locale
    }
}

/// A calendar frozen on a single day.
#[derive(Debug, Clone)]
pub struct FixedCalendar {
    today: NaiveDate,
    locale: Locale,
}

impl FixedCalendar {
    pub fn new(today: NaiveDate, locale: Locale) -> Self {
        Self { today, locale }
    }
}

impl CalendarProvider for FixedCalendar {
    fn today(&self) -> NaiveDate {
        self.today
    }

    fn locale(&self) -> &Locale {
        &self.locale
    }
}

/// Calendar-aware date arithmetic. All week and day math in the crate goes
/// through this type so week boundaries stay consistent with the locale.
#[derive(Clone)]
pub struct Calendar {
    provider: Arc<dyn CalendarProvider>,
}

impl Calendar {
    pub fn new(provider: Arc<dyn CalendarProvider>) -> Self {
        Self { provider }
    }

    pub fn fixed(today: NaiveDate, locale: Locale) -> Self {
        Self::new(Arc::new(FixedCalendar::new(today, locale)))
    }

    pub fn today(&self) -> NaiveDate {
        self.provider.today()
    }

    pub fn locale(&self) -> &Locale {
        self.provider.locale()
    }

    /// Uppercased first character of the locale's short weekday name.
    pub fn day_label(&self, date: NaiveDate) -> String {
        self.locale()
            .short_weekday_symbol(date.weekday())
            .chars()
            .next()
            .map(|first| first.to_uppercase().collect())
            .unwrap_or_default()
    }

    pub fn day_number(&self, date: NaiveDate) -> u32 {
        date.day()
    }

    pub fn month_abbreviation(&self, date: NaiveDate) -> String {
        self.locale().short_month_symbol(date).to_string()
    }

    pub fn start_of_week(&self, date: NaiveDate) -> NaiveDate {
        let first = self.locale().first_weekday().num_days_from_sunday();
        let current = date.weekday().num_days_from_sunday();
        let offset = (7 + current - first) % 7;
        date.checked_sub_days(Days::new(u64::from(offset)))
            .unwrap_or(NaiveDate::MIN)
    }

    pub fn end_of_week(&self, date: NaiveDate) -> NaiveDate {
        self.start_of_week(date)
            .checked_add_days(Days::new(6))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn start_of_month(&self, date: NaiveDate) -> NaiveDate {
        date.with_day(1).unwrap_or(date)
    }

    /// Every week start from the week of `from` through the week of `to`,
    /// ascending. Empty when `from` is after `to`.
    pub fn week_start_dates(&self, from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
        if from > to {
            return Vec::new();
        }
        let last = self.start_of_week(to);
        let mut dates = Vec::new();
        let mut current = self.start_of_week(from);
        while current <= last {
            dates.push(current);
            match current.checked_add_days(Days::new(7)) {
                Some(next) => current = next,
                None => break,
            }
        }
        dates
    }

    /// The seven days of the week containing `date`, starting on the week start.
    pub fn days_of_week(&self, date: NaiveDate) -> [NaiveDate; 7] {
        let start = self.start_of_week(date);
        std::array::from_fn(|offset| {
            start
                .checked_add_days(Days::new(offset as u64))
                .unwrap_or(NaiveDate::MAX)
        })
    }

    /// Every day of the full weeks spanning `from..=to`.
    pub fn full_weeks_covering(&self, from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
        if from > to {
            return Vec::new();
        }
        let end = self.end_of_week(to);
        self.start_of_week(from)
            .iter_days()
            .take_while(|day| *day <= end)
            .collect()
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::new(Arc::new(SystemCalendar::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn monday_calendar() -> Calendar {
        Calendar::fixed(date(2025, 10, 22), Locale::en_gb())
    }

    #[test]
    fn start_of_week_follows_locale_convention() {
        // 2025-10-22 is a Wednesday.
        let wed = date(2025, 10, 22);
        let sunday_start = Calendar::fixed(wed, Locale::en_us());
        assert_eq!(sunday_start.start_of_week(wed), date(2025, 10, 19));
        assert_eq!(monday_calendar().start_of_week(wed), date(2025, 10, 20));
        assert_eq!(monday_calendar().end_of_week(wed), date(2025, 10, 26));
    }

    #[test]
    fn start_of_week_is_idempotent() {
        let calendar = monday_calendar();
        for day in date(2025, 12, 25).iter_days().take(14) {
            let start = calendar.start_of_week(day);
            assert_eq!(calendar.start_of_week(start), start);
            assert_eq!(start.weekday(), Weekday::Mon);
        }
    }

    #[test]
    fn week_start_dates_for_single_day() {
        let calendar = monday_calendar();
        let day = date(2025, 10, 23);
        assert_eq!(calendar.week_start_dates(day, day), vec![date(2025, 10, 20)]);
    }

    #[test]
    fn week_start_dates_reversed_range_is_empty() {
        let calendar = monday_calendar();
        assert!(calendar
            .week_start_dates(date(2025, 10, 23), date(2025, 10, 22))
            .is_empty());
    }

    #[test]
    fn week_start_dates_spanning_four_weeks() {
        let calendar = monday_calendar();
        let dates = calendar.week_start_dates(date(2025, 10, 6), date(2025, 10, 27));
        assert_eq!(
            dates,
            vec![
                date(2025, 10, 6),
                date(2025, 10, 13),
                date(2025, 10, 20),
                date(2025, 10, 27)
            ]
        );
        assert!(dates.windows(2).all(|pair| (pair[1] - pair[0]).num_days() == 7));
    }

    #[test]
    fn week_start_dates_cross_year_boundary() {
        let calendar = Calendar::fixed(date(2026, 1, 2), Locale::en_us());
        let dates = calendar.week_start_dates(date(2025, 12, 24), date(2026, 1, 2));
        assert_eq!(dates, vec![date(2025, 12, 21), date(2025, 12, 28)]);
    }

    #[test]
    fn labels_and_numbers() {
        let calendar = monday_calendar();
        let thu = date(2025, 10, 23);
        assert_eq!(calendar.day_label(thu), "T");
        assert_eq!(calendar.day_number(thu), 23);
        assert_eq!(calendar.month_abbreviation(thu), "Oct");
        assert_eq!(calendar.start_of_month(thu), date(2025, 10, 1));
    }

    #[test]
    fn day_label_uppercases_lowercase_symbols() {
        let locale = Locale::new(
            Weekday::Mon,
            ["dim.", "lun.", "mar.", "mer.", "jeu.", "ven.", "sam."],
            ENGLISH_MONTHS,
        );
        let calendar = Calendar::fixed(date(2025, 10, 22), locale);
        assert_eq!(calendar.day_label(date(2025, 10, 22)), "M");
        assert_eq!(calendar.day_label(date(2025, 10, 26)), "D");
    }

    #[test]
    fn days_of_week_and_full_weeks() {
        let calendar = monday_calendar();
        let days = calendar.days_of_week(date(2025, 10, 22));
        assert_eq!(days[0], date(2025, 10, 20));
        assert_eq!(days[6], date(2025, 10, 26));

        let covering = calendar.full_weeks_covering(date(2025, 10, 22), date(2025, 10, 28));
        assert_eq!(covering.len(), 14);
        assert_eq!(covering.first(), Some(&date(2025, 10, 20)));
        assert_eq!(covering.last(), Some(&date(2025, 11, 2)));
        assert!(calendar
            .full_weeks_covering(date(2025, 10, 28), date(2025, 10, 22))
            .is_empty());
    }
}
