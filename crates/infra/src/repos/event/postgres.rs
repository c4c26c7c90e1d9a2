use super::IEventRepo;
use crate::repos::shared::repo::DeleteResult;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tickler_domain::{EventRecord, EventStatus};
use tracing::error;

pub struct PostgresEventRepo {
    pool: PgPool,
}

impl PostgresEventRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct EventRecordRaw {
    feed_id: String,
    item_id: String,
    summary: String,
    description: String,
    location: String,
    status: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    is_all_day: bool,
    external_link: String,
    last_updated: DateTime<Utc>,
}

impl From<EventRecordRaw> for EventRecord {
    fn from(raw: EventRecordRaw) -> Self {
        Self {
            feed_id: raw.feed_id,
            item_id: raw.item_id,
            summary: raw.summary,
            description: raw.description,
            location: raw.location,
            status: EventStatus::parse(&raw.status),
            start: raw.start_time,
            end: raw.end_time,
            is_all_day: raw.is_all_day,
            external_link: raw.external_link,
            last_updated: raw.last_updated,
        }
    }
}

#[async_trait::async_trait]
impl IEventRepo for PostgresEventRepo {
    async fn upsert(&self, event: &EventRecord) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO calendar_events
            (feed_id, item_id, summary, description, location, status,
             start_time, end_time, is_all_day, external_link, last_updated)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (feed_id, item_id)
            DO UPDATE SET
                summary = $3,
                description = $4,
                location = $5,
                status = $6,
                start_time = $7,
                end_time = $8,
                is_all_day = $9,
                external_link = $10,
                last_updated = $11
            "#,
        )
        .bind(&event.feed_id)
        .bind(&event.item_id)
        .bind(&event.summary)
        .bind(&event.description)
        .bind(&event.location)
        .bind(event.status.as_str())
        .bind(event.start)
        .bind(event.end)
        .bind(event.is_all_day)
        .bind(&event.external_link)
        .bind(event.last_updated)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, feed_id: &str, item_id: &str) -> Option<EventRecord> {
        sqlx::query_as::<_, EventRecordRaw>(
            r#"
            SELECT * FROM calendar_events
            WHERE feed_id = $1 AND item_id = $2
            "#,
        )
        .bind(feed_id)
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to find event record: {:?}", e);
            None
        })
        .map(|raw| raw.into())
    }

    async fn delete(&self, feed_id: &str, item_id: &str) -> Option<EventRecord> {
        sqlx::query_as::<_, EventRecordRaw>(
            r#"
            DELETE FROM calendar_events
            WHERE feed_id = $1 AND item_id = $2
            RETURNING *
            "#,
        )
        .bind(feed_id)
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to delete event record: {:?}", e);
            None
        })
        .map(|raw| raw.into())
    }

    async fn find_in_window(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Vec<EventRecord> {
        sqlx::query_as::<_, EventRecordRaw>(
            r#"
            SELECT * FROM calendar_events
            WHERE status != 'cancelled'
              AND start_time >= $1
              AND start_time <= $2
            "#,
        )
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to query events in window: {:?}", e);
            Vec::new()
        })
        .into_iter()
        .map(|raw| raw.into())
        .collect()
    }

    async fn delete_by_feed(&self, feed_id: &str) -> anyhow::Result<DeleteResult> {
        let res = sqlx::query(
            r#"
            DELETE FROM calendar_events
            WHERE feed_id = $1
            "#,
        )
        .bind(feed_id)
        .execute(&self.pool)
        .await?;
        Ok(DeleteResult {
            deleted_count: res.rows_affected() as i64,
        })
    }
}
