pub mod local;
pub mod remote;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::config::Config;
use crate::models::family::FamilyDocument;
use remote::RemoteStore;

/// Durable home of the family snapshot: a local JSON file, optionally
/// mirrored to a shared database row so other devices converge on the same
/// document. The local copy is always written first; mirroring is
/// best-effort and never fails a save.
pub struct Store {
    data_dir: String,
    family_id: RwLock<String>,
    remote: Option<RemoteStore>,
}

impl Store {
    pub async fn open(config: &Config) -> anyhow::Result<Self> {
        let family_id =
            local::load_or_create_family_id(&config.data_dir, config.family_id.as_deref())?;
        info!("Family id: {family_id}");

        let remote = match &config.database_url {
            Some(url) => match RemoteStore::connect(url).await {
                Ok(store) => {
                    info!("Cloud mirror connected");
                    Some(store)
                }
                Err(e) => {
                    warn!("Cloud mirror unavailable, running local-only: {e:#}");
                    None
                }
            },
            None => {
                info!("No DATABASE_URL — running in local-only mode");
                None
            }
        };

        Ok(Self {
            data_dir: config.data_dir.clone(),
            family_id: RwLock::new(family_id),
            remote,
        })
    }

    pub async fn family_id(&self) -> String {
        self.family_id.read().await.clone()
    }

    pub fn cloud_enabled(&self) -> bool {
        self.remote.is_some()
    }

    /// Load the snapshot, preferring the mirror so a fresh device picks up
    /// the shared state; falls back to the local file, then to an empty
    /// document.
    pub async fn load(&self) -> anyhow::Result<FamilyDocument> {
        let family_id = self.family_id().await;

        if let Some(remote) = &self.remote {
            match remote.fetch(&family_id).await {
                Ok(Some(doc)) => {
                    // Keep the local copy current for offline starts.
                    if let Err(e) = local::save(&self.data_dir, &family_id, &doc).await {
                        warn!("Failed to cache mirrored snapshot locally: {e:#}");
                    }
                    return Ok(doc);
                }
                Ok(None) => {}
                Err(e) => warn!("Failed to load from mirror, trying local: {e:#}"),
            }
        }

        Ok(local::load(&self.data_dir, &family_id)
            .await?
            .unwrap_or_default())
    }

    /// The sole commit point: local file first, then mirror.
    pub async fn save(&self, doc: &FamilyDocument) -> anyhow::Result<()> {
        let family_id = self.family_id().await;
        local::save(&self.data_dir, &family_id, doc).await?;

        if let Some(remote) = &self.remote {
            if let Err(e) = remote.upsert(&family_id, doc).await {
                warn!("Failed to mirror snapshot for family {family_id}: {e:#}");
            }
        }
        Ok(())
    }

    /// Switch to another family and persist the choice.
    pub async fn set_family_id(&self, id: &str) -> anyhow::Result<()> {
        local::store_family_id(&self.data_dir, id)?;
        *self.family_id.write().await = id.to_string();
        Ok(())
    }
}
