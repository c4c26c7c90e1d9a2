use std::sync::Arc;

use tickler_domain::{EventRecord, FeedItem, SyncCursor, SyncToken};
use tickler_infra::{
    FeedPageQuery, FeedProviderError, IFeedProvider, TicklerContext,
};
use tracing::{error, info, warn};

use crate::shared::usecase::UseCase;

/// Pulls one complete page sequence of changes for a feed and reconciles
/// the local mirror. The continuation token is only persisted after the
/// final page, so a crash mid-sequence replays the whole sequence.
pub struct SyncFeedUseCase {
    pub owner_id: String,
    pub feed_id: String,
    pub provider: Arc<dyn IFeedProvider>,
}

impl std::fmt::Debug for SyncFeedUseCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncFeedUseCase")
            .field("owner_id", &self.owner_id)
            .field("feed_id", &self.feed_id)
            .finish()
    }
}

#[derive(Debug)]
pub enum UseCaseError {
    AuthExpired,
    FeedUnavailable,
    StorageError,
}

impl SyncFeedUseCase {
    /// Follows `next_page_token` until the provider stops issuing one,
    /// accumulating items and the terminal sync token.
    async fn run_pages(
        &self,
        ctx: &TicklerContext,
        token: Option<SyncToken>,
    ) -> Result<(Vec<FeedItem>, Option<SyncToken>), FeedProviderError> {
        let time_min = match token {
            Some(_) => None,
            None => Some(ctx.sys.now() - ctx.config.full_sync_lookback),
        };

        let mut items = Vec::new();
        let mut next_sync_token = None;
        let mut page_token: Option<String> = None;

        loop {
            let query = FeedPageQuery {
                sync_token: token.clone(),
                page_token: page_token.take(),
                time_min,
            };
            let page = self
                .provider
                .fetch_page(&self.owner_id, &self.feed_id, &query)
                .await?;

            items.extend(page.items);
            if page.next_sync_token.is_some() {
                next_sync_token = page.next_sync_token;
            }

            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        Ok((items, next_sync_token))
    }
}

#[async_trait::async_trait]
impl UseCase for SyncFeedUseCase {
    type Response = Vec<EventRecord>;
    type Error = UseCaseError;

    const NAME: &'static str = "SyncFeed";

    async fn execute(&mut self, ctx: &TicklerContext) -> Result<Self::Response, Self::Error> {
        let mut token = ctx
            .repos
            .sync_cursors
            .find(&self.feed_id)
            .await
            .and_then(|cursor| cursor.token);

        let mut retried = false;
        let (items, terminal_token) = loop {
            match self.run_pages(ctx, token.take()).await {
                Ok(page_run) => break page_run,
                Err(FeedProviderError::TokenInvalid) if !retried => {
                    // Stale token. Drop it and fall back to one windowed
                    // full sync, a second rejection is terminal.
                    warn!(
                        "Feed: {} rejected the stored sync token, falling back to full sync",
                        self.feed_id
                    );
                    ctx.repos
                        .sync_cursors
                        .clear(&self.feed_id)
                        .await
                        .map_err(|_| UseCaseError::StorageError)?;
                    retried = true;
                }
                Err(FeedProviderError::TokenInvalid) => {
                    error!(
                        "Feed: {} rejected a token issued during full sync",
                        self.feed_id
                    );
                    return Err(UseCaseError::FeedUnavailable);
                }
                Err(FeedProviderError::AuthExpired) => return Err(UseCaseError::AuthExpired),
                Err(FeedProviderError::Unavailable(e)) => {
                    error!("Unable to fetch changes for feed: {}: {:?}", self.feed_id, e);
                    return Err(UseCaseError::FeedUnavailable);
                }
            }
        };

        let now = ctx.sys.now();
        let mut records = Vec::new();
        for item in items {
            if item.is_cancelled() {
                ctx.repos.events.delete(&self.feed_id, &item.id).await;
            } else if let Some(record) = EventRecord::from_feed_item(&self.feed_id, &item, now) {
                ctx.repos
                    .events
                    .upsert(&record)
                    .await
                    .map_err(|_| UseCaseError::StorageError)?;
                records.push(record);
            }
        }

        // Only a terminal token advances the baseline. A sequence without
        // one leaves the cursor alone and the next pass replays it.
        if let Some(token) = terminal_token {
            ctx.repos
                .sync_cursors
                .upsert(&SyncCursor {
                    feed_id: self.feed_id.clone(),
                    token: Some(token),
                    last_synced_at: now,
                })
                .await
                .map_err(|_| UseCaseError::StorageError)?;
        }

        info!(
            "Feed: {} reconciled {} changed items",
            self.feed_id,
            records.len()
        );

        Ok(records)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::Mutex;
    use tickler_domain::{EventStatus, FeedItemWhen};
    use tickler_infra::{FeedPage, ISys, IFeedProvider};

    struct FixedSys(DateTime<Utc>);
    impl ISys for FixedSys {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn ctx_at(at: DateTime<Utc>) -> TicklerContext {
        let mut ctx = TicklerContext::create_inmemory();
        ctx.sys = Arc::new(FixedSys(at));
        ctx
    }

    fn timed_item(id: &str, summary: &str) -> FeedItem {
        FeedItem {
            id: id.into(),
            status: EventStatus::Confirmed,
            summary: Some(summary.into()),
            description: None,
            location: None,
            html_link: None,
            when: Some(FeedItemWhen::Timed {
                start: now() + chrono::Duration::days(9),
                end: now() + chrono::Duration::days(9) + chrono::Duration::hours(1),
            }),
        }
    }

    fn cancelled_item(id: &str) -> FeedItem {
        FeedItem {
            id: id.into(),
            status: EventStatus::Cancelled,
            summary: None,
            description: None,
            location: None,
            html_link: None,
            when: None,
        }
    }

    /// One scripted response per expected `fetch_page` call. Records the
    /// queries it receives for later assertions.
    struct ScriptedProvider {
        script: Mutex<Vec<Result<FeedPage, FeedProviderError>>>,
        seen: Mutex<Vec<FeedPageQuery>>,
    }

    impl ScriptedProvider {
        fn new(script: Vec<Result<FeedPage, FeedProviderError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn queries(&self) -> Vec<FeedPageQuery> {
            std::mem::take(&mut self.seen.lock().unwrap())
        }
    }

    #[async_trait::async_trait]
    impl IFeedProvider for ScriptedProvider {
        async fn fetch_page(
            &self,
            _owner_id: &str,
            _feed_id: &str,
            query: &FeedPageQuery,
        ) -> Result<FeedPage, FeedProviderError> {
            self.seen.lock().unwrap().push(FeedPageQuery {
                sync_token: query.sync_token.clone(),
                page_token: query.page_token.clone(),
                time_min: query.time_min,
            });
            self.script.lock().unwrap().remove(0)
        }
    }

    fn page(
        items: Vec<FeedItem>,
        next_page_token: Option<&str>,
        next_sync_token: Option<&str>,
    ) -> Result<FeedPage, FeedProviderError> {
        Ok(FeedPage {
            items,
            next_page_token: next_page_token.map(String::from),
            next_sync_token: next_sync_token.map(SyncToken::new),
        })
    }

    fn usecase(provider: Arc<ScriptedProvider>) -> SyncFeedUseCase {
        SyncFeedUseCase {
            owner_id: "owner-1".into(),
            feed_id: "feed-1".into(),
            provider,
        }
    }

    #[tokio::test]
    async fn full_sync_sends_lookback_window_and_stores_terminal_token() {
        let ctx = ctx_at(now());
        let provider = ScriptedProvider::new(vec![page(
            vec![timed_item("ev-1", "Dentist")],
            None,
            Some("token-1"),
        )]);

        let res = usecase(provider.clone()).execute(&ctx).await.unwrap();
        assert_eq!(res.len(), 1);

        let queries = provider.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].sync_token, None);
        assert_eq!(
            queries[0].time_min,
            Some(now() - ctx.config.full_sync_lookback)
        );

        let cursor = ctx.repos.sync_cursors.find("feed-1").await.unwrap();
        assert_eq!(cursor.token, Some(SyncToken::new("token-1")));
        assert!(ctx.repos.events.find("feed-1", "ev-1").await.is_some());
    }

    #[tokio::test]
    async fn incremental_sync_reuses_stored_token() {
        let ctx = ctx_at(now());
        let provider =
            ScriptedProvider::new(vec![page(vec![], None, Some("token-1"))]);
        usecase(provider).execute(&ctx).await.unwrap();

        let provider = ScriptedProvider::new(vec![page(vec![], None, Some("token-2"))]);
        usecase(provider.clone()).execute(&ctx).await.unwrap();

        let queries = provider.queries();
        assert_eq!(queries[0].sync_token, Some(SyncToken::new("token-1")));
        assert_eq!(queries[0].time_min, None);

        let cursor = ctx.repos.sync_cursors.find("feed-1").await.unwrap();
        assert_eq!(cursor.token, Some(SyncToken::new("token-2")));
    }

    #[tokio::test]
    async fn repeated_sync_of_same_item_is_idempotent() {
        let ctx = ctx_at(now());
        for token in ["token-1", "token-2"] {
            let provider = ScriptedProvider::new(vec![page(
                vec![timed_item("ev-1", "Dentist")],
                None,
                Some(token),
            )]);
            usecase(provider).execute(&ctx).await.unwrap();
        }

        let from = now();
        let until = now() + chrono::Duration::days(30);
        assert_eq!(ctx.repos.events.find_in_window(from, until).await.len(), 1);
    }

    #[tokio::test]
    async fn pagination_follows_page_tokens_and_keeps_terminal_token_only() {
        let ctx = ctx_at(now());
        let provider = ScriptedProvider::new(vec![
            page(vec![timed_item("ev-1", "Dentist")], Some("page-2"), None),
            page(
                vec![timed_item("ev-2", "Vet visit")],
                None,
                Some("token-1"),
            ),
        ]);

        let res = usecase(provider.clone()).execute(&ctx).await.unwrap();
        assert_eq!(res.len(), 2);

        let queries = provider.queries();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0].page_token, None);
        assert_eq!(queries[1].page_token, Some("page-2".into()));

        let cursor = ctx.repos.sync_cursors.find("feed-1").await.unwrap();
        assert_eq!(cursor.token, Some(SyncToken::new("token-1")));
    }

    #[tokio::test]
    async fn rejected_token_falls_back_to_single_full_sync() {
        let ctx = ctx_at(now());
        ctx.repos
            .sync_cursors
            .upsert(&SyncCursor {
                feed_id: "feed-1".into(),
                token: Some(SyncToken::new("stale")),
                last_synced_at: now() - chrono::Duration::days(40),
            })
            .await
            .unwrap();

        let provider = ScriptedProvider::new(vec![
            Err(FeedProviderError::TokenInvalid),
            page(vec![timed_item("ev-1", "Dentist")], None, Some("fresh")),
        ]);

        let res = usecase(provider.clone()).execute(&ctx).await.unwrap();
        assert_eq!(res.len(), 1);

        let queries = provider.queries();
        assert_eq!(queries[0].sync_token, Some(SyncToken::new("stale")));
        assert_eq!(queries[1].sync_token, None);
        assert!(queries[1].time_min.is_some());

        let cursor = ctx.repos.sync_cursors.find("feed-1").await.unwrap();
        assert_eq!(cursor.token, Some(SyncToken::new("fresh")));
    }

    #[tokio::test]
    async fn second_token_rejection_is_terminal() {
        let ctx = ctx_at(now());
        ctx.repos
            .sync_cursors
            .upsert(&SyncCursor {
                feed_id: "feed-1".into(),
                token: Some(SyncToken::new("stale")),
                last_synced_at: now(),
            })
            .await
            .unwrap();

        let provider = ScriptedProvider::new(vec![
            Err(FeedProviderError::TokenInvalid),
            Err(FeedProviderError::TokenInvalid),
        ]);

        let res = usecase(provider).execute(&ctx).await;
        assert!(matches!(res, Err(UseCaseError::FeedUnavailable)));
        // Cursor was cleared by the fallback, next pass starts clean
        assert!(ctx.repos.sync_cursors.find("feed-1").await.is_none());
    }

    #[tokio::test]
    async fn cancelled_items_remove_the_mirrored_event() {
        let ctx = ctx_at(now());
        let provider = ScriptedProvider::new(vec![page(
            vec![timed_item("ev-1", "Dentist")],
            None,
            Some("token-1"),
        )]);
        usecase(provider).execute(&ctx).await.unwrap();
        assert!(ctx.repos.events.find("feed-1", "ev-1").await.is_some());

        let provider = ScriptedProvider::new(vec![page(
            vec![cancelled_item("ev-1")],
            None,
            Some("token-2"),
        )]);
        usecase(provider).execute(&ctx).await.unwrap();
        assert!(ctx.repos.events.find("feed-1", "ev-1").await.is_none());
    }

    #[tokio::test]
    async fn sequence_without_terminal_token_leaves_cursor_untouched() {
        let ctx = ctx_at(now());
        let provider = ScriptedProvider::new(vec![page(
            vec![timed_item("ev-1", "Dentist")],
            None,
            None,
        )]);
        usecase(provider).execute(&ctx).await.unwrap();

        assert!(ctx.repos.sync_cursors.find("feed-1").await.is_none());
        // Items are still reconciled even without a new baseline
        assert!(ctx.repos.events.find("feed-1", "ev-1").await.is_some());
    }
}
