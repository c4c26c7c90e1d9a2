use tickler_infra::TicklerContext;

use crate::shared::usecase::UseCase;

/// Drops the stored continuation token for a feed so that the next sync
/// pass performs a windowed full fetch.
#[derive(Debug)]
pub struct ResetFeedSyncUseCase {
    pub feed_id: String,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

#[async_trait::async_trait]
impl UseCase for ResetFeedSyncUseCase {
    type Response = ();
    type Error = UseCaseError;

    const NAME: &'static str = "ResetFeedSync";

    async fn execute(&mut self, ctx: &TicklerContext) -> Result<Self::Response, Self::Error> {
        ctx.repos
            .sync_cursors
            .clear(&self.feed_id)
            .await
            .map_err(|_| UseCaseError::StorageError)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Utc;
    use tickler_domain::{SyncCursor, SyncToken};

    #[tokio::test]
    async fn clears_the_stored_cursor() {
        let ctx = TicklerContext::create_inmemory();
        ctx.repos
            .sync_cursors
            .upsert(&SyncCursor {
                feed_id: "feed-1".into(),
                token: Some(SyncToken::new("token-1")),
                last_synced_at: Utc::now(),
            })
            .await
            .unwrap();

        let mut usecase = ResetFeedSyncUseCase {
            feed_id: "feed-1".into(),
        };
        usecase.execute(&ctx).await.unwrap();

        assert!(ctx.repos.sync_cursors.find("feed-1").await.is_none());
    }
}
