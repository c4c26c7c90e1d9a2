mod inmemory;
mod postgres;

use chrono::{DateTime, Utc};
pub use inmemory::InMemoryEventRepo;
pub use postgres::PostgresEventRepo;
use tickler_domain::EventRecord;

use crate::repos::shared::repo::DeleteResult;

#[async_trait::async_trait]
pub trait IEventRepo: Send + Sync {
    async fn upsert(&self, event: &EventRecord) -> anyhow::Result<()>;
    async fn find(&self, feed_id: &str, item_id: &str) -> Option<EventRecord>;
    async fn delete(&self, feed_id: &str, item_id: &str) -> Option<EventRecord>;
    /// Non-cancelled events whose start falls within `[from, until]`.
    async fn find_in_window(&self, from: DateTime<Utc>, until: DateTime<Utc>)
        -> Vec<EventRecord>;
    async fn delete_by_feed(&self, feed_id: &str) -> anyhow::Result<DeleteResult>;
}
