use super::ISyncCursorRepo;
use crate::repos::shared::inmemory_repo::*;
use std::sync::Mutex;
use tickler_domain::SyncCursor;

pub struct InMemorySyncCursorRepo {
    cursors: Mutex<Vec<SyncCursor>>,
}

impl InMemorySyncCursorRepo {
    pub fn new() -> Self {
        Self {
            cursors: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl ISyncCursorRepo for InMemorySyncCursorRepo {
    async fn find(&self, feed_id: &str) -> Option<SyncCursor> {
        find_by(&self.cursors, |c| c.feed_id == feed_id)
            .into_iter()
            .next()
    }

    async fn upsert(&self, cursor: &SyncCursor) -> anyhow::Result<()> {
        delete_by(&self.cursors, |c| c.feed_id == cursor.feed_id);
        insert(cursor, &self.cursors);
        Ok(())
    }

    async fn clear(&self, feed_id: &str) -> anyhow::Result<()> {
        delete_by(&self.cursors, |c| c.feed_id == feed_id);
        Ok(())
    }
}
