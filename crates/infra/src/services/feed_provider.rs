use chrono::{DateTime, Utc};
use tickler_domain::{FeedItem, SyncToken};

/// One page of changes from an upstream feed. `next_sync_token` is only
/// present on the terminal page of a listing.
#[derive(Debug)]
pub struct FeedPage {
    pub items: Vec<FeedItem>,
    pub next_page_token: Option<String>,
    pub next_sync_token: Option<SyncToken>,
}

#[derive(Debug, Default)]
pub struct FeedPageQuery {
    pub sync_token: Option<SyncToken>,
    pub page_token: Option<String>,
    /// Lower bound for a full listing. Ignored by providers when a sync
    /// token is given.
    pub time_min: Option<DateTime<Utc>>,
}

#[derive(Debug, thiserror::Error)]
pub enum FeedProviderError {
    #[error("Feed provider rejected the credentials")]
    AuthExpired,
    #[error("Feed provider rejected the continuation token")]
    TokenInvalid,
    #[error("Feed provider unavailable: {0}")]
    Unavailable(#[from] anyhow::Error),
}

/// Upstream source of calendar items, paginated and optionally
/// incremental.
#[async_trait::async_trait]
pub trait IFeedProvider: Send + Sync {
    async fn fetch_page(
        &self,
        owner_id: &str,
        feed_id: &str,
        query: &FeedPageQuery,
    ) -> Result<FeedPage, FeedProviderError>;
}

/// Hands out short-lived access tokens for the upstream API.
#[async_trait::async_trait]
pub trait IAccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> anyhow::Result<String>;
}
