use axum::{http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::services::relay::truncate_message;
use crate::AppState;

pub mod events;
pub mod family;
pub mod health;
pub mod members;
pub mod metrics;
pub mod overview;
pub mod relay;
pub mod tasks;

#[derive(Debug, Deserialize)]
pub struct NotifyRequest {
    #[serde(default)]
    pub member_ids: Vec<Uuid>,
}

/// SMS gateways reject long bodies, keep manual sends within one segment.
const SEND_NOW_LIMIT: usize = 140;

/// Shared by the event and task notify endpoints: fan a message out to the
/// selected members over the relay and report per-member results.
pub(crate) async fn send_now(
    state: &AppState,
    title: &str,
    member_ids: &[Uuid],
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let recipients: Vec<(String, String, String)> = {
        let doc = state.doc.read().await;
        doc.reachable_members(member_ids)
            .into_iter()
            .filter_map(|m| {
                Some((
                    m.name.clone(),
                    m.phone.clone()?,
                    m.carrier.clone()?,
                ))
            })
            .collect()
    };

    if recipients.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Selected members do not have phone numbers configured"
            })),
        ));
    }

    let message = truncate_message(title, SEND_NOW_LIMIT);
    let mut sent = 0u32;
    let mut errors: Vec<Value> = Vec::new();
    for (name, phone, carrier) in &recipients {
        match state.relay.send_sms(phone, carrier, &message).await {
            Ok(_) => sent += 1,
            Err(e) => {
                tracing::warn!("Manual reminder to {} failed: {}", name, e);
                errors.push(json!({ "member": name, "error": e.to_string() }));
            }
        }
    }

    Ok(Json(json!({
        "success": sent > 0,
        "sent": sent,
        "failed": errors.len(),
        "errors": errors,
    })))
}
