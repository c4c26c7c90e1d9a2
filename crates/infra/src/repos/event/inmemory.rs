use super::IEventRepo;
use crate::repos::shared::inmemory_repo::*;
use crate::repos::shared::repo::DeleteResult;
use chrono::{DateTime, Utc};
use std::sync::Mutex;
use tickler_domain::{EventRecord, EventStatus};

pub struct InMemoryEventRepo {
    events: Mutex<Vec<EventRecord>>,
}

impl InMemoryEventRepo {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IEventRepo for InMemoryEventRepo {
    async fn upsert(&self, event: &EventRecord) -> anyhow::Result<()> {
        delete_by(&self.events, |e| {
            e.feed_id == event.feed_id && e.item_id == event.item_id
        });
        insert(event, &self.events);
        Ok(())
    }

    async fn find(&self, feed_id: &str, item_id: &str) -> Option<EventRecord> {
        find_by(&self.events, |e| {
            e.feed_id == feed_id && e.item_id == item_id
        })
        .into_iter()
        .next()
    }

    async fn delete(&self, feed_id: &str, item_id: &str) -> Option<EventRecord> {
        find_and_delete_by(&self.events, |e| {
            e.feed_id == feed_id && e.item_id == item_id
        })
        .into_iter()
        .next()
    }

    async fn find_in_window(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Vec<EventRecord> {
        find_by(&self.events, |e| {
            e.status != EventStatus::Cancelled && e.start >= from && e.start <= until
        })
    }

    async fn delete_by_feed(&self, feed_id: &str) -> anyhow::Result<DeleteResult> {
        Ok(delete_by(&self.events, |e| e.feed_id == feed_id))
    }
}
