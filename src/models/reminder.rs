use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which kind of item a reminder record points back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Event,
    Task,
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ItemType::Event => "event",
            ItemType::Task => "task",
        };
        write!(f, "{s}")
    }
}

/// Reminder configuration embedded in an event or task.
///
/// A configuration only takes effect when `enabled` is true AND both the
/// offset list and the recipient list are non-empty; anything less is
/// treated the same as no configuration at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderSettings {
    pub enabled: bool,
    /// Relative offset labels, e.g. "1 day before". Unknown labels are
    /// ignored by the scheduler rather than rejected.
    pub offsets: Vec<String>,
    pub member_ids: Vec<Uuid>,
}

impl ReminderSettings {
    pub fn is_active(&self) -> bool {
        self.enabled && !self.offsets.is_empty() && !self.member_ids.is_empty()
    }
}

/// A single scheduled notification, materialized by the scheduler and
/// consumed by the dispatcher.
///
/// `item_id` is a weak reference: deleting the owning item leaves the record
/// behind, and the dispatcher removes it on the next scan without sending.
/// `sent` only ever transitions false → true.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderRecord {
    pub id: Uuid,
    pub item_type: ItemType,
    pub item_id: Uuid,
    /// Local wall-clock time the reminder should fire.
    pub scheduled_time: NaiveDateTime,
    pub sent: bool,
    /// Recipients captured at scheduling time; membership changes after the
    /// last save are intersected back in at fire time.
    pub member_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl ReminderRecord {
    pub fn new(
        item_type: ItemType,
        item_id: Uuid,
        scheduled_time: NaiveDateTime,
        member_ids: Vec<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            item_type,
            item_id,
            scheduled_time,
            sent: false,
            member_ids,
            created_at: Utc::now(),
        }
    }

    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        !self.sent && self.scheduled_time <= now
    }
}
