use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::reminder::ItemType;
use crate::models::task::{SaveTaskRequest, Task};
use crate::routes::{send_now, NotifyRequest};
use crate::services::scheduler;
use crate::AppState;

/// Open tasks first, by due date with undated last; completed tasks trail.
pub async fn list_tasks(State(state): State<AppState>) -> Json<Vec<Task>> {
    let doc = state.doc.read().await;
    let mut tasks = doc.tasks.clone();
    tasks.sort_by_key(|t| (t.completed, t.due_at().is_none(), t.due_at()));
    Json(tasks)
}

pub async fn create_task(
    State(state): State<AppState>,
    Json(body): Json<SaveTaskRequest>,
) -> Result<(StatusCode, Json<Task>), (StatusCode, Json<Value>)> {
    let title = body.title.trim().to_string();
    if title.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Task title is required" })),
        ));
    }

    let task = Task {
        id: Uuid::new_v4(),
        title,
        assignee: body.assignee,
        due_date: body.due_date,
        due_time: body.due_time,
        description: body.description,
        reminders: body.reminders,
        completed: false,
        created_at: Utc::now(),
    };

    {
        let mut doc = state.doc.write().await;
        doc.tasks.push(task.clone());
        scheduler::schedule(&mut doc, ItemType::Task, task.id);
    }
    state.save_snapshot().await;

    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SaveTaskRequest>,
) -> Result<Json<Task>, (StatusCode, Json<Value>)> {
    let title = body.title.trim().to_string();
    if title.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Task title is required" })),
        ));
    }

    let updated = {
        let mut doc = state.doc.write().await;
        let Some(task) = doc.tasks.iter_mut().find(|t| t.id == id) else {
            return Err((
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Task not found" })),
            ));
        };
        task.title = title;
        task.assignee = body.assignee;
        task.due_date = body.due_date;
        task.due_time = body.due_time;
        task.description = body.description;
        task.reminders = body.reminders;
        let updated = task.clone();

        scheduler::schedule(&mut doc, ItemType::Task, id);
        updated
    };
    state.save_snapshot().await;

    Ok(Json(updated))
}

pub async fn toggle_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Task>, (StatusCode, Json<Value>)> {
    let updated = {
        let mut doc = state.doc.write().await;
        let Some(task) = doc.tasks.iter_mut().find(|t| t.id == id) else {
            return Err((
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Task not found" })),
            ));
        };
        task.completed = !task.completed;
        task.clone()
    };
    state.save_snapshot().await;

    Ok(Json(updated))
}

/// Reminder records are left for the dispatcher's orphan sweep, same as
/// event deletion.
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    {
        let mut doc = state.doc.write().await;
        let before = doc.tasks.len();
        doc.tasks.retain(|t| t.id != id);
        if doc.tasks.len() == before {
            return Err((
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Task not found" })),
            ));
        }
    }
    state.save_snapshot().await;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /tasks/{id}/notify — immediate manual fan-out to selected members.
pub async fn notify_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<NotifyRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let title = {
        let doc = state.doc.read().await;
        match doc.task(id) {
            Some(task) => task.title.clone(),
            None => {
                return Err((
                    StatusCode::NOT_FOUND,
                    Json(json!({ "error": "Task not found" })),
                ))
            }
        }
    };
    send_now(&state, &title, &body.member_ids).await
}
