use super::IFeedSubscriptionRepo;
use crate::repos::shared::inmemory_repo::*;
use std::sync::Mutex;
use tickler_domain::FeedSubscription;

pub struct InMemoryFeedSubscriptionRepo {
    subscriptions: Mutex<Vec<FeedSubscription>>,
}

impl InMemoryFeedSubscriptionRepo {
    pub fn new() -> Self {
        Self {
            subscriptions: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IFeedSubscriptionRepo for InMemoryFeedSubscriptionRepo {
    async fn insert(&self, subscription: &FeedSubscription) -> anyhow::Result<()> {
        insert(subscription, &self.subscriptions);
        Ok(())
    }

    async fn find(&self, owner_id: &str, feed_id: &str) -> Option<FeedSubscription> {
        find_by(&self.subscriptions, |s| {
            s.owner_id == owner_id && s.feed_id == feed_id
        })
        .into_iter()
        .next()
    }

    async fn find_all(&self) -> Vec<FeedSubscription> {
        find_by(&self.subscriptions, |_| true)
    }

    async fn find_by_owner(&self, owner_id: &str) -> Vec<FeedSubscription> {
        find_by(&self.subscriptions, |s| s.owner_id == owner_id)
    }

    async fn delete(&self, owner_id: &str, feed_id: &str) -> Option<FeedSubscription> {
        find_and_delete_by(&self.subscriptions, |s| {
            s.owner_id == owner_id && s.feed_id == feed_id
        })
        .into_iter()
        .next()
    }
}
