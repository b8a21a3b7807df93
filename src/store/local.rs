use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use rand::Rng;

use crate::models::family::FamilyDocument;

fn snapshot_path(data_dir: &str, family_id: &str) -> PathBuf {
    Path::new(data_dir).join(format!("family_{family_id}.json"))
}

fn family_id_path(data_dir: &str) -> PathBuf {
    Path::new(data_dir).join("family_id")
}

/// Resolve the family id: explicit override wins, then the persisted id file,
/// otherwise generate a random 6-digit id and persist it.
pub fn load_or_create_family_id(
    data_dir: &str,
    override_id: Option<&str>,
) -> anyhow::Result<String> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data dir {data_dir}"))?;

    if let Some(id) = override_id {
        return Ok(id.to_string());
    }

    let path = family_id_path(data_dir);
    match std::fs::read_to_string(&path) {
        Ok(id) => {
            let id = id.trim().to_string();
            if !id.is_empty() {
                return Ok(id);
            }
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }

    let id = rand::thread_rng().gen_range(100_000..1_000_000).to_string();
    std::fs::write(&path, &id)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(id)
}

/// Persist a replacement family id (joining another family).
pub fn store_family_id(data_dir: &str, id: &str) -> anyhow::Result<()> {
    let path = family_id_path(data_dir);
    std::fs::write(&path, id).with_context(|| format!("Failed to write {}", path.display()))
}

pub async fn load(data_dir: &str, family_id: &str) -> anyhow::Result<Option<FamilyDocument>> {
    let path = snapshot_path(data_dir, family_id);
    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let doc = serde_json::from_slice(&bytes)
                .with_context(|| format!("Corrupt snapshot {}", path.display()))?;
            Ok(Some(doc))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}

/// Write the full snapshot. Goes through a temp file + rename so a crash
/// mid-write cannot leave a truncated snapshot behind.
pub async fn save(data_dir: &str, family_id: &str, doc: &FamilyDocument) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(data_dir)
        .await
        .with_context(|| format!("Failed to create data dir {data_dir}"))?;

    let path = snapshot_path(data_dir, family_id);
    let tmp = path.with_extension("json.tmp");
    let bytes = serde_json::to_vec_pretty(doc).context("Failed to serialize snapshot")?;

    tokio::fs::write(&tmp, &bytes)
        .await
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, &path)
        .await
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::member::Member;
    use chrono::Utc;
    use uuid::Uuid;

    fn temp_dir(tag: &str) -> String {
        let dir = std::env::temp_dir().join(format!("familyhub-{tag}-{}", Uuid::new_v4()));
        dir.to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn snapshot_round_trip() {
        let dir = temp_dir("roundtrip");
        let mut doc = FamilyDocument::default();
        doc.members.push(Member {
            id: Uuid::new_v4(),
            name: "Sam".into(),
            phone: Some("5551234567".into()),
            carrier: Some("verizon".into()),
            created_at: Utc::now(),
        });

        save(&dir, "123456", &doc).await.unwrap();
        let loaded = load(&dir, "123456").await.unwrap().unwrap();
        assert_eq!(loaded.members.len(), 1);
        assert_eq!(loaded.members[0].name, "Sam");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn missing_snapshot_is_none() {
        let dir = temp_dir("missing");
        std::fs::create_dir_all(&dir).unwrap();
        assert!(load(&dir, "000000").await.unwrap().is_none());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn family_id_is_generated_once() {
        let dir = temp_dir("familyid");
        let first = load_or_create_family_id(&dir, None).unwrap();
        let second = load_or_create_family_id(&dir, None).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 6);
        assert!(first.chars().all(|c| c.is_ascii_digit()));

        // Env override bypasses the persisted id.
        let forced = load_or_create_family_id(&dir, Some("654321")).unwrap();
        assert_eq!(forced, "654321");

        std::fs::remove_dir_all(&dir).ok();
    }
}
