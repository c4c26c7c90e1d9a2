mod auth_provider;
mod calendar_api;

use std::sync::Arc;

pub use auth_provider::GoogleAuthProvider;
use calendar_api::GoogleCalendarRestApi;
use tickler_domain::SyncToken;

use crate::services::feed_provider::{
    FeedPage, FeedPageQuery, FeedProviderError, IAccessTokenProvider, IFeedProvider,
};

/// Google Calendar as a change feed, via `events.list` with
/// `singleEvents=true` so recurring events arrive pre-expanded.
pub struct GoogleCalendarFeedProvider {
    auth: Arc<dyn IAccessTokenProvider>,
}

impl GoogleCalendarFeedProvider {
    pub fn new(auth: Arc<dyn IAccessTokenProvider>) -> Self {
        Self { auth }
    }
}

#[async_trait::async_trait]
impl IFeedProvider for GoogleCalendarFeedProvider {
    async fn fetch_page(
        &self,
        _owner_id: &str,
        feed_id: &str,
        query: &FeedPageQuery,
    ) -> Result<FeedPage, FeedProviderError> {
        let access_token = self
            .auth
            .access_token()
            .await
            .map_err(|_| FeedProviderError::AuthExpired)?;
        let api = GoogleCalendarRestApi::new(access_token);

        let res = api.list_events(feed_id, query).await?;

        Ok(FeedPage {
            items: res.items.into_iter().map(|item| item.into()).collect(),
            next_page_token: res.next_page_token,
            next_sync_token: res.next_sync_token.map(SyncToken::new),
        })
    }
}
