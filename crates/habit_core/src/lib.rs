pub mod calendar;
pub mod config;
pub mod error;
pub mod habit;
pub mod logging;
pub mod notifications;
pub mod overview;
pub mod reminder;
pub mod service;
pub mod store;

pub use crate::calendar::{Calendar, CalendarProvider, FixedCalendar, Locale, SystemCalendar};
pub use crate::error::HabitError;
pub use crate::habit::{Habit, HabitDraft, HabitId, HabitLog};
pub use crate::reminder::{Reminder, ReminderId};
pub use crate::service::{HabitService, HabitServiceBuilder};
