use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Directory holding the family id file and local snapshot files.
    pub data_dir: String,
    /// Fixed family id; when unset, a persisted 6-digit id is generated.
    pub family_id: Option<String>,
    // Cloud mirror (optional)
    pub database_url: Option<String>,
    // SendGrid (optional — the relay endpoint returns 500 until configured)
    pub sendgrid_api_key: Option<String>,
    pub sendgrid_from_email: Option<String>,
    // Relay endpoint
    /// Shared secret for the relay endpoint; absent means the endpoint is open.
    pub relay_api_key: Option<String>,
    /// Where the dispatcher posts reminders. Defaults to this process's own
    /// /send-reminder route.
    pub relay_url: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "./data".into()),
            family_id: env::var("FAMILY_ID").ok().filter(|s| !s.is_empty()),
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            sendgrid_api_key: env::var("SENDGRID_API_KEY").ok().filter(|s| !s.is_empty()),
            sendgrid_from_email: env::var("SENDGRID_FROM_EMAIL")
                .ok()
                .filter(|s| !s.is_empty()),
            relay_api_key: env::var("RELAY_API_KEY").ok().filter(|s| !s.is_empty()),
            relay_url: env::var("RELAY_URL").ok().filter(|s| !s.is_empty()),
        })
    }

    /// Relay target used by the dispatcher and the send-now handlers.
    pub fn relay_endpoint(&self) -> String {
        self.relay_url
            .clone()
            .unwrap_or_else(|| format!("http://127.0.0.1:{}/send-reminder", self.port))
    }
}
