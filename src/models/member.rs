use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub name: String,
    /// 10-digit phone number, stored stripped of formatting. Phone and
    /// carrier are set together or not at all.
    pub phone: Option<String>,
    pub carrier: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Member {
    /// A member can receive SMS reminders only with both phone and carrier.
    pub fn is_reachable(&self) -> bool {
        self.phone.is_some() && self.carrier.is_some()
    }
}

// Request DTOs

#[derive(Debug, Deserialize)]
pub struct CreateMemberRequest {
    pub name: String,
    pub phone: Option<String>,
    pub carrier: Option<String>,
}
