use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::event::{Event, SaveEventRequest};
use crate::models::reminder::ItemType;
use crate::routes::{send_now, NotifyRequest};
use crate::services::scheduler;
use crate::AppState;

pub async fn list_events(State(state): State<AppState>) -> Json<Vec<Event>> {
    let doc = state.doc.read().await;
    let mut events = doc.events.clone();
    events.sort_by_key(|e| e.occurs_at());
    Json(events)
}

pub async fn create_event(
    State(state): State<AppState>,
    Json(body): Json<SaveEventRequest>,
) -> Result<(StatusCode, Json<Event>), (StatusCode, Json<Value>)> {
    let title = body.title.trim().to_string();
    if title.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Event title is required" })),
        ));
    }

    let event = Event {
        id: Uuid::new_v4(),
        title,
        date: body.date,
        time: body.time,
        description: body.description,
        reminders: body.reminders,
        created_at: Utc::now(),
    };

    {
        let mut doc = state.doc.write().await;
        doc.events.push(event.clone());
        scheduler::schedule(&mut doc, ItemType::Event, event.id);
    }
    state.save_snapshot().await;

    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SaveEventRequest>,
) -> Result<Json<Event>, (StatusCode, Json<Value>)> {
    let title = body.title.trim().to_string();
    if title.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Event title is required" })),
        ));
    }

    let updated = {
        let mut doc = state.doc.write().await;
        let Some(event) = doc.events.iter_mut().find(|e| e.id == id) else {
            return Err((
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Event not found" })),
            ));
        };
        event.title = title;
        event.date = body.date;
        event.time = body.time;
        event.description = body.description;
        event.reminders = body.reminders;
        let updated = event.clone();

        scheduler::schedule(&mut doc, ItemType::Event, id);
        updated
    };
    state.save_snapshot().await;

    Ok(Json(updated))
}

/// Reminder records for the event are left behind on purpose; the dispatcher
/// drops them as orphans on its next scan.
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    {
        let mut doc = state.doc.write().await;
        let before = doc.events.len();
        doc.events.retain(|e| e.id != id);
        if doc.events.len() == before {
            return Err((
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Event not found" })),
            ));
        }
    }
    state.save_snapshot().await;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /events/{id}/notify — immediate manual fan-out to selected members.
pub async fn notify_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<NotifyRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let title = {
        let doc = state.doc.read().await;
        match doc.event(id) {
            Some(event) => event.title.clone(),
            None => {
                return Err((
                    StatusCode::NOT_FOUND,
                    Json(json!({ "error": "Event not found" })),
                ))
            }
        }
    };
    send_now(&state, &title, &body.member_ids).await
}
