use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::reminder::ReminderSettings;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    /// Optional local time of day; date-only events behave as midnight for
    /// reminder arithmetic.
    pub time: Option<NaiveTime>,
    pub description: Option<String>,
    pub reminders: Option<ReminderSettings>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Local date-time reminders are computed relative to.
    pub fn occurs_at(&self) -> NaiveDateTime {
        self.date
            .and_time(self.time.unwrap_or(NaiveTime::MIN))
    }
}

// Request DTOs

#[derive(Debug, Deserialize)]
pub struct SaveEventRequest {
    pub title: String,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub description: Option<String>,
    pub reminders: Option<ReminderSettings>,
}
