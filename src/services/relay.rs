use anyhow::{anyhow, Context};
use reqwest::Client;
use serde_json::json;

/// Cap a message body, replacing the tail with an ellipsis when over budget.
/// Counts chars, not bytes, so multi-byte titles cannot split mid-character.
pub fn truncate_message(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

/// HTTP client onto the relay endpoint, used by the dispatcher and the
/// send-now handlers. One invocation per recipient; no retries here — failed
/// records are picked up again by the next dispatcher scan.
pub struct RelayClient {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl RelayClient {
    pub fn new(url: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            url,
            api_key,
        }
    }

    /// Returns the gateway address the relay reported sending to.
    pub async fn send_sms(
        &self,
        phone: &str,
        carrier: &str,
        message: &str,
    ) -> anyhow::Result<String> {
        let mut request = self.client.post(&self.url).json(&json!({
            "phone": phone,
            "carrier": carrier,
            "message": message,
        }));
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await.context("Relay request failed")?;
        let status = response.status();
        let body: serde_json::Value = response.json().await.unwrap_or_else(|_| json!({}));

        if status.is_success() {
            Ok(body
                .get("sentTo")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string())
        } else {
            let reason = body
                .get("error")
                .or_else(|| body.get("details"))
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {status}"));
            Err(anyhow!(reason))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_messages_pass_through() {
        assert_eq!(truncate_message("Soccer practice", 140), "Soccer practice");
    }

    #[test]
    fn exact_limit_is_untouched() {
        let s = "x".repeat(160);
        assert_eq!(truncate_message(&s, 160), s);
    }

    #[test]
    fn long_messages_get_ellipsis() {
        let s = "y".repeat(200);
        let out = truncate_message(&s, 160);
        assert_eq!(out.chars().count(), 160);
        assert!(out.ends_with("..."));
        assert_eq!(&out[..157], &s[..157]);
    }

    #[test]
    fn truncation_counts_chars_not_bytes() {
        let s = "é".repeat(150);
        let out = truncate_message(&s, 140);
        assert_eq!(out.chars().count(), 140);
        assert!(out.ends_with("..."));
    }
}
