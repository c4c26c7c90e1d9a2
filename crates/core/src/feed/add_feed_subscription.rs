use tickler_domain::FeedSubscription;
use tickler_infra::TicklerContext;

use crate::shared::usecase::UseCase;

#[derive(Debug)]
pub struct AddFeedSubscriptionUseCase {
    pub owner_id: String,
    pub feed_id: String,
    pub display_name: String,
}

#[derive(Debug)]
pub enum UseCaseError {
    AlreadySubscribed,
    InvalidFeedId,
    StorageError,
}

#[async_trait::async_trait]
impl UseCase for AddFeedSubscriptionUseCase {
    type Response = FeedSubscription;
    type Error = UseCaseError;

    const NAME: &'static str = "AddFeedSubscription";

    async fn execute(&mut self, ctx: &TicklerContext) -> Result<Self::Response, Self::Error> {
        let feed_id = self.feed_id.trim();
        if feed_id.is_empty() {
            return Err(UseCaseError::InvalidFeedId);
        }

        if ctx
            .repos
            .feed_subscriptions
            .find(&self.owner_id, feed_id)
            .await
            .is_some()
        {
            return Err(UseCaseError::AlreadySubscribed);
        }

        let display_name = match self.display_name.trim() {
            "" => feed_id.to_string(),
            name => name.to_string(),
        };

        let subscription = FeedSubscription {
            owner_id: self.owner_id.clone(),
            feed_id: feed_id.to_string(),
            display_name,
        };
        ctx.repos
            .feed_subscriptions
            .insert(&subscription)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(subscription)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn subscribes_and_rejects_duplicates() {
        let ctx = TicklerContext::create_inmemory();
        let mut usecase = AddFeedSubscriptionUseCase {
            owner_id: "owner-1".into(),
            feed_id: "feed-1".into(),
            display_name: "Family calendar".into(),
        };

        let res = usecase.execute(&ctx).await.unwrap();
        assert_eq!(res.display_name, "Family calendar");

        let res = usecase.execute(&ctx).await;
        assert!(matches!(res, Err(UseCaseError::AlreadySubscribed)));
    }

    #[tokio::test]
    async fn blank_display_name_falls_back_to_feed_id() {
        let ctx = TicklerContext::create_inmemory();
        let mut usecase = AddFeedSubscriptionUseCase {
            owner_id: "owner-1".into(),
            feed_id: "feed-1".into(),
            display_name: "   ".into(),
        };

        let res = usecase.execute(&ctx).await.unwrap();
        assert_eq!(res.display_name, "feed-1");
    }

    #[tokio::test]
    async fn rejects_blank_feed_id() {
        let ctx = TicklerContext::create_inmemory();
        let mut usecase = AddFeedSubscriptionUseCase {
            owner_id: "owner-1".into(),
            feed_id: "  ".into(),
            display_name: "Family calendar".into(),
        };

        let res = usecase.execute(&ctx).await;
        assert!(matches!(res, Err(UseCaseError::InvalidFeedId)));
    }
}
