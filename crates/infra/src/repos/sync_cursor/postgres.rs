use super::ISyncCursorRepo;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tickler_domain::{SyncCursor, SyncToken};
use tracing::error;

pub struct PostgresSyncCursorRepo {
    pool: PgPool,
}

impl PostgresSyncCursorRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SyncCursorRaw {
    feed_id: String,
    sync_token: Option<String>,
    last_synced_at: DateTime<Utc>,
}

impl From<SyncCursorRaw> for SyncCursor {
    fn from(raw: SyncCursorRaw) -> Self {
        Self {
            feed_id: raw.feed_id,
            token: raw.sync_token.filter(|t| !t.is_empty()).map(SyncToken::new),
            last_synced_at: raw.last_synced_at,
        }
    }
}

#[async_trait::async_trait]
impl ISyncCursorRepo for PostgresSyncCursorRepo {
    async fn find(&self, feed_id: &str) -> Option<SyncCursor> {
        sqlx::query_as::<_, SyncCursorRaw>(
            r#"
            SELECT * FROM sync_cursors
            WHERE feed_id = $1
            "#,
        )
        .bind(feed_id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to find sync cursor: {:?}", e);
            None
        })
        .map(|raw| raw.into())
    }

    async fn upsert(&self, cursor: &SyncCursor) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sync_cursors (feed_id, sync_token, last_synced_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (feed_id)
            DO UPDATE SET sync_token = $2, last_synced_at = $3
            "#,
        )
        .bind(&cursor.feed_id)
        .bind(cursor.token.as_ref().map(|t| t.as_str()))
        .bind(cursor.last_synced_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn clear(&self, feed_id: &str) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            DELETE FROM sync_cursors
            WHERE feed_id = $1
            "#,
        )
        .bind(feed_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
