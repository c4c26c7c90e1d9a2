use tickler_domain::FeedSubscription;
use tickler_infra::TicklerContext;
use tracing::info;

use crate::shared::usecase::UseCase;

/// Unsubscribes a feed and drops its mirrored state: the sync cursor and
/// every event record under the feed. Occurrences are left to the next
/// hydration pass, which sweeps rows whose event disappeared.
#[derive(Debug)]
pub struct RemoveFeedSubscriptionUseCase {
    pub owner_id: String,
    pub feed_id: String,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound,
    StorageError,
}

#[async_trait::async_trait]
impl UseCase for RemoveFeedSubscriptionUseCase {
    type Response = FeedSubscription;
    type Error = UseCaseError;

    const NAME: &'static str = "RemoveFeedSubscription";

    async fn execute(&mut self, ctx: &TicklerContext) -> Result<Self::Response, Self::Error> {
        let subscription = ctx
            .repos
            .feed_subscriptions
            .delete(&self.owner_id, &self.feed_id)
            .await
            .ok_or(UseCaseError::NotFound)?;

        ctx.repos
            .sync_cursors
            .clear(&self.feed_id)
            .await
            .map_err(|_| UseCaseError::StorageError)?;
        let deleted = ctx
            .repos
            .events
            .delete_by_feed(&self.feed_id)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        info!(
            "Feed: {} unsubscribed, dropped {} mirrored events",
            self.feed_id, deleted.deleted_count
        );

        Ok(subscription)
    }
}
