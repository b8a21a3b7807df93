use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::models::family::FamilyDocument;

/// Cloud mirror: one JSONB row per family, replaced wholesale on every save.
/// There is no conflict detection — two devices saving concurrently is
/// last-write-wins at snapshot granularity.
pub struct RemoteStore {
    pool: PgPool,
}

impl RemoteStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .context("Failed to connect to mirror database")?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run mirror migrations")?;
        Ok(Self { pool })
    }

    pub async fn fetch(&self, family_id: &str) -> anyhow::Result<Option<FamilyDocument>> {
        let row: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT doc FROM families WHERE id = $1")
                .bind(family_id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(serde_json::from_value)
            .transpose()
            .with_context(|| format!("Corrupt mirrored snapshot for family {family_id}"))
    }

    pub async fn upsert(&self, family_id: &str, doc: &FamilyDocument) -> anyhow::Result<()> {
        let doc = serde_json::to_value(doc).context("Failed to serialize snapshot")?;
        sqlx::query(
            "INSERT INTO families (id, doc, updated_at)
             VALUES ($1, $2, now())
             ON CONFLICT (id) DO UPDATE SET doc = EXCLUDED.doc, updated_at = now()",
        )
        .bind(family_id)
        .bind(doc)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
