mod reset_feed_sync;
mod sync_feed;

pub use reset_feed_sync::ResetFeedSyncUseCase;
pub use sync_feed::SyncFeedUseCase;
