use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::reminder::ReminderId;

pub const DEFAULT_REMINDER_TITLE: &str = "Habit Reminder";

/// A local notification repeating every day at `hour:minute`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyNotification {
    pub id: ReminderId,
    pub hour: u32,
    pub minute: u32,
    pub title: String,
    pub subtitle: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotificationError {
    #[error("notification permission was denied")]
    AuthorizationDenied,
    #[error("notification platform error: {0}")]
    Platform(String),
}

/// Platform-specific notification adapters will implement this trait.
pub trait NotificationSink: Send + Sync {
    fn request_authorization(&self) -> Result<(), NotificationError> {
        Ok(())
    }
    fn schedule_daily(&self, notification: DailyNotification) -> Result<(), NotificationError>;
    fn cancel(&self, id: ReminderId);
}

/// Sink used when no platform adapter is installed.
#[derive(Debug, Default)]
pub struct NoopSink;

impl NotificationSink for NoopSink {
    fn schedule_daily(&self, _notification: DailyNotification) -> Result<(), NotificationError> {
        Ok(())
    }

    fn cancel(&self, _id: ReminderId) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    Authorize,
    Schedule(DailyNotification),
    Cancel(ReminderId),
}

/// Records every call in order. Can be told to refuse authorization.
#[derive(Debug, Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<SinkCall>>,
    deny: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn denying() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            deny: true,
        }
    }

    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().clone()
    }

    pub fn scheduled(&self) -> Vec<DailyNotification> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                SinkCall::Schedule(notification) => Some(notification.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn cancelled(&self) -> Vec<ReminderId> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                SinkCall::Cancel(id) => Some(*id),
                _ => None,
            })
            .collect()
    }
}

impl NotificationSink for RecordingSink {
    fn request_authorization(&self) -> Result<(), NotificationError> {
        self.calls.lock().push(SinkCall::Authorize);
        if self.deny {
            Err(NotificationError::AuthorizationDenied)
        } else {
            Ok(())
        }
    }

    fn schedule_daily(&self, notification: DailyNotification) -> Result<(), NotificationError> {
        if self.deny {
            return Err(NotificationError::AuthorizationDenied);
        }
        self.calls.lock().push(SinkCall::Schedule(notification));
        Ok(())
    }

    fn cancel(&self, id: ReminderId) {
        self.calls.lock().push(SinkCall::Cancel(id));
    }
}

/// Holds schedule and cancel calls back until a change has been saved, then
/// forwards them in order.
#[derive(Debug, Default)]
pub(crate) struct DeferredSink {
    calls: Mutex<Vec<SinkCall>>,
}

impl DeferredSink {
    pub(crate) fn flush(self, sink: &dyn NotificationSink) {
        for call in self.calls.into_inner() {
            match call {
                SinkCall::Schedule(notification) => {
                    let id = notification.id;
                    if let Err(err) = sink.schedule_daily(notification) {
                        tracing::warn!(reminder = %id, %err, "reminder kept but not scheduled");
                    }
                }
                SinkCall::Cancel(id) => sink.cancel(id),
                SinkCall::Authorize => {}
            }
        }
    }
}

impl NotificationSink for DeferredSink {
    fn schedule_daily(&self, notification: DailyNotification) -> Result<(), NotificationError> {
        self.calls.lock().push(SinkCall::Schedule(notification));
        Ok(())
    }

    fn cancel(&self, id: ReminderId) {
        self.calls.lock().push(SinkCall::Cancel(id));
    }
}

impl<T: NotificationSink + ?Sized> NotificationSink for std::sync::Arc<T> {
    fn request_authorization(&self) -> Result<(), NotificationError> {
        (**self).request_authorization()
    }

    fn schedule_daily(&self, notification: DailyNotification) -> Result<(), NotificationError> {
        (**self).schedule_daily(notification)
    }

    fn cancel(&self, id: ReminderId) {
        (**self).cancel(id)
    }
}
