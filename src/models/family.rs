use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::event::Event;
use crate::models::member::Member;
use crate::models::reminder::{ItemType, ReminderRecord};
use crate::models::task::Task;

/// The whole shared family snapshot. Persisted and mirrored as a single
/// document; every mutation rewrites the full blob (last-write-wins).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FamilyDocument {
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub reminders: Vec<ReminderRecord>,
}

impl FamilyDocument {
    pub fn event(&self, id: Uuid) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn task(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn member(&self, id: Uuid) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    /// Title of the item a reminder record points at, if it still exists.
    pub fn item_title(&self, item_type: ItemType, item_id: Uuid) -> Option<&str> {
        match item_type {
            ItemType::Event => self.event(item_id).map(|e| e.title.as_str()),
            ItemType::Task => self.task(item_id).map(|t| t.title.as_str()),
        }
    }

    /// Members from `ids` that still exist and can receive SMS.
    pub fn reachable_members(&self, ids: &[Uuid]) -> Vec<&Member> {
        self.members
            .iter()
            .filter(|m| ids.contains(&m.id) && m.is_reachable())
            .collect()
    }
}
