use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::carrier;
use crate::models::member::{CreateMemberRequest, Member};
use crate::routes::relay::clean_phone;
use crate::AppState;

/// Check the optional phone/carrier pair: both or neither, 10 digits, known
/// carrier. Returns the normalized pair.
fn validate_contact(
    phone: Option<&str>,
    carrier_name: Option<&str>,
) -> Result<(Option<String>, Option<String>), String> {
    let phone = phone.map(clean_phone).filter(|p| !p.is_empty());
    let carrier_name = carrier_name
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty());

    if let Some(digits) = &phone {
        if digits.len() != 10 {
            return Err("Phone number must be 10 digits".into());
        }
    }
    if phone.is_some() != carrier_name.is_some() {
        return Err("Phone and carrier must be provided together".into());
    }
    if let Some(c) = &carrier_name {
        if carrier::gateway(c).is_none() {
            return Err(format!(
                "Unknown carrier. Supported carriers: {}",
                carrier::supported_carriers()
            ));
        }
    }
    Ok((phone, carrier_name))
}

pub async fn list_members(State(state): State<AppState>) -> Json<Vec<Member>> {
    Json(state.doc.read().await.members.clone())
}

pub async fn create_member(
    State(state): State<AppState>,
    Json(body): Json<CreateMemberRequest>,
) -> Result<(StatusCode, Json<Member>), (StatusCode, Json<Value>)> {
    let name = body.name.trim().to_string();
    if name.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Member name is required" })),
        ));
    }

    let (phone, carrier_name) = validate_contact(body.phone.as_deref(), body.carrier.as_deref())
        .map_err(|e| (StatusCode::BAD_REQUEST, Json(json!({ "error": e }))))?;

    let member = Member {
        id: Uuid::new_v4(),
        name,
        phone,
        carrier: carrier_name,
        created_at: Utc::now(),
    };

    {
        let mut doc = state.doc.write().await;
        if doc
            .members
            .iter()
            .any(|m| m.name.eq_ignore_ascii_case(&member.name))
        {
            return Err((
                StatusCode::CONFLICT,
                Json(json!({ "error": "A member with this name already exists" })),
            ));
        }
        doc.members.push(member.clone());
    }
    state.save_snapshot().await;

    Ok((StatusCode::CREATED, Json(member)))
}

pub async fn delete_member(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    {
        let mut doc = state.doc.write().await;
        let before = doc.members.len();
        doc.members.retain(|m| m.id != id);
        if doc.members.len() == before {
            return Err((
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Member not found" })),
            ));
        }
    }
    state.save_snapshot().await;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_pair_is_all_or_nothing() {
        assert!(validate_contact(Some("5551234567"), None).is_err());
        assert!(validate_contact(None, Some("verizon")).is_err());
        assert!(validate_contact(None, None).is_ok());

        let (phone, carrier_name) =
            validate_contact(Some("(555) 123-4567"), Some("Verizon")).unwrap();
        assert_eq!(phone.as_deref(), Some("5551234567"));
        assert_eq!(carrier_name.as_deref(), Some("verizon"));
    }

    #[test]
    fn short_phone_is_rejected() {
        assert!(validate_contact(Some("12345"), Some("att")).is_err());
        assert!(validate_contact(Some("555-123-45678"), Some("att")).is_err());
    }

    #[test]
    fn unknown_carrier_is_rejected() {
        let err = validate_contact(Some("5551234567"), Some("rogers")).unwrap_err();
        assert!(err.contains("Supported carriers"));
    }

    #[test]
    fn empty_strings_count_as_absent() {
        assert!(validate_contact(Some(""), Some("")).is_ok());
    }
}
