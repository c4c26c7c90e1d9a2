use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use tickler_domain::{PromptHandle, ReminderOccurrence, ID};

use super::IReminderOccurrenceRepo;
use crate::repos::shared::inmemory_repo::{delete_by, find, find_by, insert, update_many};
use crate::repos::shared::repo::DeleteResult;

pub struct InMemoryReminderOccurrenceRepo {
    occurrences: Mutex<Vec<ReminderOccurrence>>,
}

impl InMemoryReminderOccurrenceRepo {
    pub fn new() -> Self {
        Self {
            occurrences: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IReminderOccurrenceRepo for InMemoryReminderOccurrenceRepo {
    async fn insert(&self, occurrence: &ReminderOccurrence) -> anyhow::Result<()> {
        insert(occurrence, &self.occurrences);
        Ok(())
    }

    async fn find(&self, occurrence_id: &ID) -> Option<ReminderOccurrence> {
        find(occurrence_id, &self.occurrences)
    }

    async fn find_all(&self) -> Vec<ReminderOccurrence> {
        find_by(&self.occurrences, |_| true)
    }

    async fn find_by_natural_key(
        &self,
        rule_id: &ID,
        feed_id: &str,
        item_id: &str,
        occurrence_start: DateTime<Utc>,
    ) -> Option<ReminderOccurrence> {
        find_by(&self.occurrences, |o| {
            o.rule_id == *rule_id
                && o.feed_id == feed_id
                && o.item_id == item_id
                && o.occurrence_start == occurrence_start
        })
        .into_iter()
        .next()
    }

    async fn set_reminder_at(
        &self,
        occurrence_id: &ID,
        reminder_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        update_many(
            &self.occurrences,
            |o| o.id == *occurrence_id && o.completed_at.is_none(),
            |o| o.reminder_at = reminder_at,
        );
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
        delete_by(&self.occurrences, |o| {
            o.feed_id == feed_id
                && o.item_id == item_id
                && o.completed_at.is_none()
                && o.occurrence_start >= day_start
                && o.occurrence_start < day_end
                && o.occurrence_start != keep_start
        })
    }

    async fn delete_other_rules(
        &self,
        feed_id: &str,
        item_id: &str,
        occurrence_start: DateTime<Utc>,
        keep_rule_id: &ID,
    ) -> DeleteResult {
        delete_by(&self.occurrences, |o| {
            o.feed_id == feed_id
                && o.item_id == item_id
                && o.occurrence_start == occurrence_start
                && o.rule_id != *keep_rule_id
        })
    }

    async fn delete_orphaned(&self, live_rule_ids: &[ID]) -> DeleteResult {
        delete_by(&self.occurrences, |o| !live_rule_ids.contains(&o.rule_id))
    }

    async fn delete_by_rule(&self, rule_id: &ID) -> DeleteResult {
        delete_by(&self.occurrences, |o| o.rule_id == *rule_id)
    }

    async fn find_due(
        &self,
        now: DateTime<Utc>,
        ping_window: Duration,
        throttle: Duration,
    ) -> Vec<ReminderOccurrence> {
        find_by(&self.occurrences, |o| o.is_due(now, ping_window, throttle))
    }

    async fn find_active_prompts(&self, now: DateTime<Utc>) -> Vec<ReminderOccurrence> {
        find_by(&self.occurrences, |o| {
            o.prompt_handle.is_some() && !o.start_has_passed(now)
        })
    }

    async fn mark_prompt_sent(
        &self,
        occurrence_id: &ID,
        handle: &PromptHandle,
        now: DateTime<Utc>,
        snoozed_until: Option<DateTime<Utc>>,
    ) -> anyhow::Result<()> {
        update_many(
            &self.occurrences,
            |o| o.id == *occurrence_id && o.completed_at.is_none(),
            |o| {
                o.prompt_handle = Some(handle.clone());
                o.last_prompt_at = Some(now);
                o.snoozed_until = snoozed_until;
            },
        );
        Ok(())
    }

    async fn snooze(
        &self,
        occurrence_id: &ID,
        now: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        update_many(
            &self.occurrences,
            |o| o.id == *occurrence_id && o.completed_at.is_none(),
            |o| {
                o.snoozed_until = Some(until);
                o.last_prompt_at = Some(now);
            },
        );
        Ok(())
    }

    async fn complete(
        &self,
        occurrence_id: &ID,
        now: DateTime<Utc>,
        notes: Option<&str>,
    ) -> anyhow::Result<()> {
        update_many(
            &self.occurrences,
            |o| o.id == *occurrence_id && o.completed_at.is_none(),
            |o| {
                o.completed_at = Some(now);
                if let Some(notes) = notes {
                    o.arrangements_notes = Some(notes.to_string());
                }
            },
        );
        Ok(())
    }

    async fn set_arrangements_notes(
        &self,
        occurrence_id: &ID,
        notes: Option<&str>,
    ) -> anyhow::Result<()> {
        update_many(
            &self.occurrences,
            |o| o.id == *occurrence_id,
            |o| o.arrangements_notes = notes.map(|n| n.to_string()),
        );
        Ok(())
    }
}
