mod add_feed_subscription;
mod remove_feed_subscription;

pub use add_feed_subscription::AddFeedSubscriptionUseCase;
pub use remove_feed_subscription::RemoveFeedSubscriptionUseCase;
