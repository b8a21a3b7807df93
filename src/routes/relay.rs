use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::models::carrier;
use crate::services::mailer::MailError;
use crate::services::metrics;
use crate::services::relay::truncate_message;
use crate::AppState;

/// Carrier gateways typically accept ~160 chars per message.
const SMS_LIMIT: usize = 160;
const SMS_SUBJECT: &str = "Family Hub Reminder";

#[derive(Deserialize)]
pub struct SendReminderRequest {
    pub phone: Option<String>,
    pub carrier: Option<String>,
    pub message: Option<String>,
}

/// Strip formatting down to the bare digits.
pub fn clean_phone(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn rejected(reason: &str, status: StatusCode, error: String) -> (StatusCode, Json<Value>) {
    metrics::SMS_REJECTED.with_label_values(&[reason]).inc();
    (status, Json(json!({ "error": error })))
}

/// POST /send-reminder — forward one SMS through a carrier email gateway.
///
/// Stateless: validates, composes `{digits}@{gateway}`, submits a single
/// plain-text email to the provider, and reports the outcome. Never retries;
/// the dispatcher owns retry behavior.
pub async fn send_reminder(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SendReminderRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    // Shared secret gates everything when configured; without one the
    // endpoint is open by design.
    if let Some(expected) = &state.config.relay_api_key {
        let provided = headers.get("x-api-key").and_then(|v| v.to_str().ok());
        if provided != Some(expected.as_str()) {
            return Err(rejected(
                "unauthorized",
                StatusCode::UNAUTHORIZED,
                "Unauthorized - Invalid API key".into(),
            ));
        }
    }

    let phone = payload.phone.unwrap_or_default();
    let carrier_name = payload.carrier.unwrap_or_default();
    let message = payload.message.unwrap_or_default();

    if phone.is_empty() || carrier_name.is_empty() || message.is_empty() {
        return Err(rejected(
            "missing-fields",
            StatusCode::BAD_REQUEST,
            "Missing required fields: phone, carrier, message".into(),
        ));
    }

    let digits = clean_phone(&phone);
    if digits.len() != 10 {
        return Err(rejected(
            "invalid-phone",
            StatusCode::BAD_REQUEST,
            "Invalid phone number. Must be 10 digits.".into(),
        ));
    }

    let Some(gateway) = carrier::gateway(&carrier_name) else {
        return Err(rejected(
            "unknown-carrier",
            StatusCode::BAD_REQUEST,
            format!(
                "Invalid carrier. Supported carriers: {}",
                carrier::supported_carriers()
            ),
        ));
    };

    let Some(mailer) = state.mailer.as_ref() else {
        return Err(rejected(
            "misconfigured",
            StatusCode::INTERNAL_SERVER_ERROR,
            "Email provider not configured. Set SENDGRID_API_KEY and SENDGRID_FROM_EMAIL.".into(),
        ));
    };

    let destination = format!("{digits}@{gateway}");
    let sms = truncate_message(&message, SMS_LIMIT);

    match mailer.send_text(&destination, SMS_SUBJECT, &sms).await {
        Ok(()) => {
            metrics::SMS_RELAYED
                .with_label_values(&[&carrier_name.to_lowercase()])
                .inc();
            Ok(Json(json!({
                "success": true,
                "message": "SMS reminder sent successfully",
                "sentTo": destination,
            })))
        }
        Err(MailError::Provider { message }) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to send SMS", "details": message })),
        )),
        Err(e @ MailError::Transport(_)) => {
            tracing::error!("Relay transport failure: {e}");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error", "details": e.to_string() })),
            ))
        }
    }
}

/// POST /send-reminder/test — push a canned message through the relay client
/// to verify the full chain (endpoint, secret, provider, gateway address).
pub async fn test_relay(State(state): State<AppState>) -> Json<Value> {
    match state
        .relay
        .send_sms("1234567890", "verizon", "Family Hub connection test")
        .await
    {
        Ok(sent_to) => Json(json!({ "success": true, "sentTo": sent_to })),
        Err(e) => Json(json!({ "success": false, "error": e.to_string() })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_phone_strips_formatting() {
        assert_eq!(clean_phone("555-123-4567"), "5551234567");
        assert_eq!(clean_phone("(555) 123 4567"), "5551234567");
        assert_eq!(clean_phone("+1 555.123.4567"), "15551234567");
    }

    #[test]
    fn destination_address_composition() {
        let digits = clean_phone("555-123-4567");
        let gateway = carrier::gateway("Verizon").unwrap();
        assert_eq!(format!("{digits}@{gateway}"), "5551234567@vtext.com");
    }

    #[test]
    fn every_carrier_composes_a_gateway_address() {
        let digits = clean_phone("5551234567");
        for (key, domain) in carrier::CARRIER_GATEWAYS {
            let gateway = carrier::gateway(key).unwrap();
            assert_eq!(format!("{digits}@{gateway}"), format!("5551234567@{domain}"));
        }
    }

    #[test]
    fn outbound_message_truncated_to_160() {
        let long = "z".repeat(200);
        let sms = truncate_message(&long, SMS_LIMIT);
        assert_eq!(sms.len(), 160);
        assert_eq!(&sms[..157], &long[..157]);
        assert!(sms.ends_with("..."));
    }
}
