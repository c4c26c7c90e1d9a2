use chrono::{DateTime, Duration, NaiveTime, Utc};
use sqlx::{types::Uuid, FromRow, PgPool};
use tickler_domain::{PromptHandle, ReminderOccurrence, ID};
use tracing::error;

use super::IReminderOccurrenceRepo;
use crate::repos::shared::repo::DeleteResult;

pub struct PostgresReminderOccurrenceRepo {
    pool: PgPool,
}

impl PostgresReminderOccurrenceRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ReminderOccurrenceRaw {
    occurrence_uid: Uuid,
    rule_uid: Uuid,
    feed_id: String,
    item_id: String,
    occurrence_start: DateTime<Utc>,
    occurrence_end: Option<DateTime<Utc>>,
    summary: String,
    reminder_at: DateTime<Utc>,
    is_all_day: bool,
    arrangements_required: bool,
    arrangements_notes: Option<String>,
    completed_at: Option<DateTime<Utc>>,
    last_prompt_at: Option<DateTime<Utc>>,
    snoozed_until: Option<DateTime<Utc>>,
    prompt_handle: Option<String>,
}

impl From<ReminderOccurrenceRaw> for ReminderOccurrence {
    fn from(raw: ReminderOccurrenceRaw) -> Self {
        Self {
            id: raw.occurrence_uid.into(),
            rule_id: raw.rule_uid.into(),
            feed_id: raw.feed_id,
            item_id: raw.item_id,
            occurrence_start: raw.occurrence_start,
            occurrence_end: raw.occurrence_end,
            summary: raw.summary,
            reminder_at: raw.reminder_at,
            is_all_day: raw.is_all_day,
            arrangements_required: raw.arrangements_required,
            arrangements_notes: raw.arrangements_notes,
            completed_at: raw.completed_at,
            last_prompt_at: raw.last_prompt_at,
            snoozed_until: raw.snoozed_until,
            prompt_handle: raw.prompt_handle.map(PromptHandle::new),
        }
    }
}

fn deleted(res: Result<sqlx::postgres::PgQueryResult, sqlx::Error>, what: &str) -> DeleteResult {
    match res {
        Ok(res) => DeleteResult {
            deleted_count: res.rows_affected() as i64,
        },
        Err(e) => {
            error!("Unable to delete {}: {:?}", what, e);
            DeleteResult { deleted_count: 0 }
        }
    }
}

#[async_trait::async_trait]
impl IReminderOccurrenceRepo for PostgresReminderOccurrenceRepo {
    async fn insert(&self, occurrence: &ReminderOccurrence) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reminder_occurrences
            (occurrence_uid, rule_uid, feed_id, item_id, occurrence_start,
             occurrence_end, summary, reminder_at, is_all_day,
             arrangements_required, arrangements_notes, completed_at,
             last_prompt_at, snoozed_until, prompt_handle)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(occurrence.id.inner_ref())
        .bind(occurrence.rule_id.inner_ref())
        .bind(&occurrence.feed_id)
        .bind(&occurrence.item_id)
        .bind(occurrence.occurrence_start)
        .bind(occurrence.occurrence_end)
        .bind(&occurrence.summary)
        .bind(occurrence.reminder_at)
        .bind(occurrence.is_all_day)
        .bind(occurrence.arrangements_required)
        .bind(&occurrence.arrangements_notes)
        .bind(occurrence.completed_at)
        .bind(occurrence.last_prompt_at)
        .bind(occurrence.snoozed_until)
        .bind(occurrence.prompt_handle.as_ref().map(|h| h.as_str()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, occurrence_id: &ID) -> Option<ReminderOccurrence> {
        sqlx::query_as::<_, ReminderOccurrenceRaw>(
            r#"
            SELECT * FROM reminder_occurrences
            WHERE occurrence_uid = $1
            "#,
        )
        .bind(occurrence_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to find reminder occurrence: {:?}", e);
            None
        })
        .map(|raw| raw.into())
    }

    async fn find_all(&self) -> Vec<ReminderOccurrence> {
        sqlx::query_as::<_, ReminderOccurrenceRaw>(
            r#"
            SELECT * FROM reminder_occurrences
            ORDER BY occurrence_start ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to list reminder occurrences: {:?}", e);
            Vec::new()
        })
        .into_iter()
        .map(|raw| raw.into())
        .collect()
    }

    async fn find_by_natural_key(
        &self,
        rule_id: &ID,
        feed_id: &str,
        item_id: &str,
        occurrence_start: DateTime<Utc>,
    ) -> Option<ReminderOccurrence> {
        sqlx::query_as::<_, ReminderOccurrenceRaw>(
            r#"
            SELECT * FROM reminder_occurrences
            WHERE rule_uid = $1 AND feed_id = $2 AND item_id = $3
              AND occurrence_start = $4
            "#,
        )
        .bind(rule_id.inner_ref())
        .bind(feed_id)
        .bind(item_id)
        .bind(occurrence_start)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to find reminder occurrence: {:?}", e);
            None
        })
        .map(|raw| raw.into())
    }

    async fn set_reminder_at(
        &self,
        occurrence_id: &ID,
        reminder_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE reminder_occurrences
            SET reminder_at = $2
            WHERE occurrence_uid = $1 AND completed_at IS NULL
            "#,
        )
        .bind(occurrence_id.inner_ref())
        .bind(reminder_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_day_shifted(
        &self,
        feed_id: &str,
        item_id: &str,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
        keep_start: DateTime<Utc>,
    ) -> DeleteResult {
        let res = sqlx::query(
            r#"
            DELETE FROM reminder_occurrences
            WHERE feed_id = $1 AND item_id = $2
              AND completed_at IS NULL
              AND occurrence_start >= $3 AND occurrence_start < $4
              AND occurrence_start != $5
            "#,
        )
        .bind(feed_id)
        .bind(item_id)
        .bind(day_start)
        .bind(day_end)
        .bind(keep_start)
        .execute(&self.pool)
        .await;
        deleted(res, "day shifted reminder occurrences")
    }

    async fn delete_other_rules(
        &self,
        feed_id: &str,
        item_id: &str,
        occurrence_start: DateTime<Utc>,
        keep_rule_id: &ID,
    ) -> DeleteResult {
        let res = sqlx::query(
            r#"
            DELETE FROM reminder_occurrences
            WHERE feed_id = $1 AND item_id = $2 AND occurrence_start = $3
              AND rule_uid != $4
            "#,
        )
        .bind(feed_id)
        .bind(item_id)
        .bind(occurrence_start)
        .bind(keep_rule_id.inner_ref())
        .execute(&self.pool)
        .await;
        deleted(res, "reminder occurrences of other rules")
    }

    async fn delete_orphaned(&self, live_rule_ids: &[ID]) -> DeleteResult {
        let live_uids = live_rule_ids.iter().map(|id| *id.inner_ref()).collect::<Vec<_>>();
        let res = sqlx::query(
            r#"
            DELETE FROM reminder_occurrences
            WHERE rule_uid != ALL($1)
            "#,
        )
        .bind(&live_uids)
        .execute(&self.pool)
        .await;
        deleted(res, "orphaned reminder occurrences")
    }

    async fn delete_by_rule(&self, rule_id: &ID) -> DeleteResult {
        let res = sqlx::query(
            r#"
            DELETE FROM reminder_occurrences
            WHERE rule_uid = $1
            "#,
        )
        .bind(rule_id.inner_ref())
        .execute(&self.pool)
        .await;
        deleted(res, "reminder occurrences by rule")
    }

    async fn find_due(
        &self,
        now: DateTime<Utc>,
        ping_window: Duration,
        throttle: Duration,
    ) -> Vec<ReminderOccurrence> {
        // All-day starts are compared at UTC day granularity, timed starts
        // at instant granularity. Mirrors ReminderOccurrence::is_due.
        let today_start = now
            .date_naive()
            .and_time(NaiveTime::MIN)
            .and_utc();
        let ping_cutoff = now + ping_window;
        let throttle_cutoff = now - throttle;
        sqlx::query_as::<_, ReminderOccurrenceRaw>(
            r#"
            SELECT * FROM reminder_occurrences
            WHERE completed_at IS NULL
              AND reminder_at <= $1
              AND (snoozed_until IS NULL OR snoozed_until <= $1)
              AND ((is_all_day AND occurrence_start >= $2)
                OR (NOT is_all_day AND occurrence_start >= $1))
              AND (NOT arrangements_required OR occurrence_start <= $3)
              AND (last_prompt_at IS NULL OR last_prompt_at <= $4)
            ORDER BY occurrence_start ASC
            "#,
        )
        .bind(now)
        .bind(today_start)
        .bind(ping_cutoff)
        .bind(throttle_cutoff)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to query due reminder occurrences: {:?}", e);
            Vec::new()
        })
        .into_iter()
        .map(|raw| raw.into())
        .collect()
    }

    async fn find_active_prompts(&self, now: DateTime<Utc>) -> Vec<ReminderOccurrence> {
        let today_start = now
            .date_naive()
            .and_time(NaiveTime::MIN)
            .and_utc();
        sqlx::query_as::<_, ReminderOccurrenceRaw>(
            r#"
            SELECT * FROM reminder_occurrences
            WHERE prompt_handle IS NOT NULL
              AND ((is_all_day AND occurrence_start >= $2)
                OR (NOT is_all_day AND occurrence_start >= $1))
            "#,
        )
        .bind(now)
        .bind(today_start)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to query active reminder prompts: {:?}", e);
            Vec::new()
        })
        .into_iter()
        .map(|raw| raw.into())
        .collect()
    }

    async fn mark_prompt_sent(
        &self,
        occurrence_id: &ID,
        handle: &PromptHandle,
        now: DateTime<Utc>,
        snoozed_until: Option<DateTime<Utc>>,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE reminder_occurrences
            SET prompt_handle = $2, last_prompt_at = $3, snoozed_until = $4
            WHERE occurrence_uid = $1 AND completed_at IS NULL
            "#,
        )
        .bind(occurrence_id.inner_ref())
        .bind(handle.as_str())
        .bind(now)
        .bind(snoozed_until)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn snooze(
        &self,
        occurrence_id: &ID,
        now: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE reminder_occurrences
            SET snoozed_until = $3, last_prompt_at = $2
            WHERE occurrence_uid = $1 AND completed_at IS NULL
            "#,
        )
        .bind(occurrence_id.inner_ref())
        .bind(now)
        .bind(until)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn complete(
        &self,
        occurrence_id: &ID,
        now: DateTime<Utc>,
        notes: Option<&str>,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE reminder_occurrences
            SET completed_at = $2,
                arrangements_notes = COALESCE($3, arrangements_notes)
            WHERE occurrence_uid = $1 AND completed_at IS NULL
            "#,
        )
        .bind(occurrence_id.inner_ref())
        .bind(now)
        .bind(notes)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_arrangements_notes(
        &self,
        occurrence_id: &ID,
        notes: Option<&str>,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE reminder_occurrences
            SET arrangements_notes = $2
            WHERE occurrence_uid = $1
            "#,
        )
        .bind(occurrence_id.inner_ref())
        .bind(notes)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
