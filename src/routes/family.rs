use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct JoinFamilyRequest {
    pub family_id: String,
}

pub async fn get_family(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "family_id": state.store.family_id().await,
        "cloud_sync": state.store.cloud_enabled(),
    }))
}

/// Switch to another family code and pull its snapshot. Nothing is written
/// back here; the joined snapshot replaces the in-memory document as-is.
pub async fn join_family(
    State(state): State<AppState>,
    Json(body): Json<JoinFamilyRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let id = body.family_id.trim();
    if id.len() != 6 || !id.chars().all(|c| c.is_ascii_digit()) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Family ID must be exactly 6 digits" })),
        ));
    }

    state.store.set_family_id(id).await.map_err(|e| {
        tracing::error!("Failed to switch family: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to switch family" })),
        )
    })?;

    let doc = state.store.load().await.map_err(|e| {
        tracing::error!("Failed to load snapshot for family {}: {:#}", id, e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to load family data" })),
        )
    })?;
    *state.doc.write().await = doc;

    Ok(Json(json!({
        "family_id": id,
        "cloud_sync": state.store.cloud_enabled(),
    })))
}
