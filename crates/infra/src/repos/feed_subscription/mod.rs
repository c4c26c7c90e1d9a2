mod inmemory;
mod postgres;

pub use inmemory::InMemoryFeedSubscriptionRepo;
pub use postgres::PostgresFeedSubscriptionRepo;
use tickler_domain::FeedSubscription;

#[async_trait::async_trait]
pub trait IFeedSubscriptionRepo: Send + Sync {
    async fn insert(&self, subscription: &FeedSubscription) -> anyhow::Result<()>;
    async fn find(&self, owner_id: &str, feed_id: &str) -> Option<FeedSubscription>;
    async fn find_all(&self) -> Vec<FeedSubscription>;
    async fn find_by_owner(&self, owner_id: &str) -> Vec<FeedSubscription>;
    async fn delete(&self, owner_id: &str, feed_id: &str) -> Option<FeedSubscription>;
}
