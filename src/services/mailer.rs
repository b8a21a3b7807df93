use reqwest::Client;
use serde_json::json;

use crate::config::Config;

const SENDGRID_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// The provider rejected the send; `message` is its first reported error.
    #[error("{message}")]
    Provider { message: String },
    #[error("Email provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Transactional-email client used by the relay endpoint.
pub struct Mailer {
    client: Client,
    api_key: String,
    from: String,
}

impl Mailer {
    /// Returns None until both the API key and the verified sender address
    /// are configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        Some(Self {
            client: Client::new(),
            api_key: config.sendgrid_api_key.clone()?,
            from: config.sendgrid_from_email.clone()?,
        })
    }

    /// Single-recipient plain-text send. Carrier gateway addresses are not
    /// real mailboxes, so list/bounce/unsubscribe management is bypassed —
    /// they must never be treated as marketing contacts.
    pub async fn send_text(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        let payload = json!({
            "personalizations": [{ "to": [{ "email": to }] }],
            "from": { "email": self.from },
            "subject": subject,
            "content": [{ "type": "text/plain", "value": body }],
            "mail_settings": {
                "bypass_list_management": { "enable": true }
            }
        });

        let response = self
            .client
            .post(SENDGRID_SEND_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body: serde_json::Value = response.json().await.unwrap_or_else(|_| json!({}));
        let message = body
            .get("errors")
            .and_then(|errors| errors.get(0))
            .and_then(|err| err.get("message"))
            .and_then(|msg| msg.as_str())
            .unwrap_or("Unknown provider error")
            .to_string();
        tracing::error!("SendGrid rejected send ({status}): {body}");

        Err(MailError::Provider { message })
    }
}
