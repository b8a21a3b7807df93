use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::reminder::ReminderSettings;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    /// Display name of the assigned member, if any.
    pub assignee: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub due_time: Option<NaiveTime>,
    pub description: Option<String>,
    pub reminders: Option<ReminderSettings>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Local due date-time, when the task has a due date. Tasks without one
    /// never produce reminder records.
    pub fn due_at(&self) -> Option<NaiveDateTime> {
        self.due_date
            .map(|d| d.and_time(self.due_time.unwrap_or(NaiveTime::MIN)))
    }
}

// Request DTOs

#[derive(Debug, Deserialize)]
pub struct SaveTaskRequest {
    pub title: String,
    pub assignee: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub due_time: Option<NaiveTime>,
    pub description: Option<String>,
    pub reminders: Option<ReminderSettings>,
}
