mod inmemory;
mod postgres;

pub use inmemory::InMemorySyncCursorRepo;
pub use postgres::PostgresSyncCursorRepo;
use tickler_domain::SyncCursor;

/// Persists the per-feed continuation token. The token is written
/// atomically by the sync engine after a full page-sequence completes;
/// `clear` forces a full resync on the next pass.
#[async_trait::async_trait]
pub trait ISyncCursorRepo: Send + Sync {
    async fn find(&self, feed_id: &str) -> Option<SyncCursor>;
    async fn upsert(&self, cursor: &SyncCursor) -> anyhow::Result<()>;
    async fn clear(&self, feed_id: &str) -> anyhow::Result<()>;
}
