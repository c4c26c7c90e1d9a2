mod inmemory;
mod postgres;

use chrono::{DateTime, Duration, Utc};
pub use inmemory::InMemoryReminderOccurrenceRepo;
pub use postgres::PostgresReminderOccurrenceRepo;
use tickler_domain::{PromptHandle, ReminderOccurrence, ID};

use crate::repos::shared::repo::DeleteResult;

/// Storage for occurrence rows. Every mutating operation is a per-row
/// conditional update so that a scheduler prompt and a user
/// acknowledgement racing on the same occurrence cannot corrupt state:
/// once `completed_at` is set only `set_arrangements_notes` still applies.
#[async_trait::async_trait]
pub trait IReminderOccurrenceRepo: Send + Sync {
    async fn insert(&self, occurrence: &ReminderOccurrence) -> anyhow::Result<()>;
    async fn find(&self, occurrence_id: &ID) -> Option<ReminderOccurrence>;
    async fn find_all(&self) -> Vec<ReminderOccurrence>;
    async fn find_by_natural_key(
        &self,
        rule_id: &ID,
        feed_id: &str,
        item_id: &str,
        occurrence_start: DateTime<Utc>,
    ) -> Option<ReminderOccurrence>;
    async fn set_reminder_at(
        &self,
        occurrence_id: &ID,
        reminder_at: DateTime<Utc>,
    ) -> anyhow::Result<()>;
    /// Removes non-completed occurrences of the same (feed, item) inside
    /// `[day_start, day_end)` whose start differs from `keep_start`.
    /// Handles same-day time shifts of the source event.
    async fn delete_day_shifted(
        &self,
        feed_id: &str,
        item_id: &str,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
        keep_start: DateTime<Utc>,
    ) -> DeleteResult;
    /// Removes occurrences for the same (feed, item, start) owned by a
    /// different rule. Handles re-matching after rule changes.
    async fn delete_other_rules(
        &self,
        feed_id: &str,
        item_id: &str,
        occurrence_start: DateTime<Utc>,
        keep_rule_id: &ID,
    ) -> DeleteResult;
    /// Removes occurrences whose rule is no longer in `live_rule_ids`.
    async fn delete_orphaned(&self, live_rule_ids: &[ID]) -> DeleteResult;
    async fn delete_by_rule(&self, rule_id: &ID) -> DeleteResult;
    async fn find_due(
        &self,
        now: DateTime<Utc>,
        ping_window: Duration,
        throttle: Duration,
    ) -> Vec<ReminderOccurrence>;
    /// Occurrences with a live prompt handle whose start has not passed.
    async fn find_active_prompts(&self, now: DateTime<Utc>) -> Vec<ReminderOccurrence>;
    async fn mark_prompt_sent(
        &self,
        occurrence_id: &ID,
        handle: &PromptHandle,
        now: DateTime<Utc>,
        snoozed_until: Option<DateTime<Utc>>,
    ) -> anyhow::Result<()>;
    async fn snooze(
        &self,
        occurrence_id: &ID,
        now: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> anyhow::Result<()>;
    async fn complete(
        &self,
        occurrence_id: &ID,
        now: DateTime<Utc>,
        notes: Option<&str>,
    ) -> anyhow::Result<()>;
    async fn set_arrangements_notes(
        &self,
        occurrence_id: &ID,
        notes: Option<&str>,
    ) -> anyhow::Result<()>;
}
