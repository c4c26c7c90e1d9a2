use super::IReminderRuleRepo;
use chrono::{DateTime, Utc};
use sqlx::{types::Uuid, FromRow, PgPool};
use tickler_domain::{ReminderRule, ID};
use tracing::error;

pub struct PostgresReminderRuleRepo {
    pool: PgPool,
}

impl PostgresReminderRuleRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ReminderRuleRaw {
    rule_uid: Uuid,
    keyword: String,
    reminder_days: i64,
    notify_targets: Vec<String>,
    arrangements_required: bool,
    created_by: String,
    created_at: DateTime<Utc>,
}

impl From<ReminderRuleRaw> for ReminderRule {
    fn from(raw: ReminderRuleRaw) -> Self {
        Self {
            id: raw.rule_uid.into(),
            keyword: raw.keyword,
            reminder_days: raw.reminder_days,
            notify_targets: raw.notify_targets,
            arrangements_required: raw.arrangements_required,
            created_by: raw.created_by,
            created_at: raw.created_at,
        }
    }
}

#[async_trait::async_trait]
impl IReminderRuleRepo for PostgresReminderRuleRepo {
    async fn insert(&self, rule: &ReminderRule) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reminder_rules
            (rule_uid, keyword, reminder_days, notify_targets,
             arrangements_required, created_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(rule.id.inner_ref())
        .bind(&rule.keyword)
        .bind(rule.reminder_days)
        .bind(&rule.notify_targets)
        .bind(rule.arrangements_required)
        .bind(&rule.created_by)
        .bind(rule.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, rule_id: &ID) -> Option<ReminderRule> {
        sqlx::query_as::<_, ReminderRuleRaw>(
            r#"
            SELECT * FROM reminder_rules
            WHERE rule_uid = $1
            "#,
        )
        .bind(rule_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to find reminder rule: {:?}", e);
            None
        })
        .map(|raw| raw.into())
    }

    async fn find_all(&self) -> Vec<ReminderRule> {
        sqlx::query_as::<_, ReminderRuleRaw>(
            r#"
            SELECT * FROM reminder_rules
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to list reminder rules: {:?}", e);
            Vec::new()
        })
        .into_iter()
        .map(|raw| raw.into())
        .collect()
    }

    async fn delete(&self, rule_id: &ID) -> Option<ReminderRule> {
        sqlx::query_as::<_, ReminderRuleRaw>(
            r#"
            DELETE FROM reminder_rules
            WHERE rule_uid = $1
            RETURNING *
            "#,
        )
        .bind(rule_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to delete reminder rule: {:?}", e);
            None
        })
        .map(|raw| raw.into())
    }
}
