use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tickler_infra::{IFeedProvider, IPromptSink, TicklerContext};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::reminders::{HydrateOccurrencesUseCase, RefreshPromptsUseCase, SendDuePromptsUseCase};
use crate::shared::usecase::execute;
use crate::sync::SyncFeedUseCase;

/// Drives one scheduling tick: per-feed sync, then hydration, then prompt
/// delivery and refresh. Per-feed failures are isolated so one broken
/// feed never blocks the others.
pub struct SyncJobRunner {
    ctx: TicklerContext,
    provider: Arc<dyn IFeedProvider>,
    sink: Arc<dyn IPromptSink>,
    /// Feeds with a sync currently in flight. Overlapping ticks skip a
    /// busy feed rather than queue behind it.
    in_flight: Mutex<HashSet<String>>,
}

impl SyncJobRunner {
    pub fn new(
        ctx: TicklerContext,
        provider: Arc<dyn IFeedProvider>,
        sink: Arc<dyn IPromptSink>,
    ) -> Self {
        Self {
            ctx,
            provider,
            sink,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    fn try_begin(&self, feed_id: &str) -> bool {
        self.in_flight.lock().unwrap().insert(feed_id.to_string())
    }

    fn finish(&self, feed_id: &str) {
        self.in_flight.lock().unwrap().remove(feed_id);
    }

    pub async fn run_tick(&self) {
        let subscriptions = self.ctx.repos.feed_subscriptions.find_all().await;
        for subscription in subscriptions {
            if !self.try_begin(&subscription.feed_id) {
                info!(
                    "Feed: {} sync still in progress, skipping this tick",
                    subscription.feed_id
                );
                continue;
            }
            let res = execute(
                SyncFeedUseCase {
                    owner_id: subscription.owner_id.clone(),
                    feed_id: subscription.feed_id.clone(),
                    provider: self.provider.clone(),
                },
                &self.ctx,
            )
            .await;
            self.finish(&subscription.feed_id);
            if let Err(e) = res {
                error!(
                    "Unable to sync feed: {} this tick. Error: {:?}",
                    subscription.feed_id, e
                );
            }
        }

        if let Err(e) = execute(HydrateOccurrencesUseCase, &self.ctx).await {
            error!("Unable to hydrate occurrences this tick. Error: {:?}", e);
            return;
        }
        if let Err(e) = execute(
            SendDuePromptsUseCase {
                sink: self.sink.clone(),
            },
            &self.ctx,
        )
        .await
        {
            error!("Unable to deliver due prompts this tick. Error: {:?}", e);
        }
        if let Err(e) = execute(
            RefreshPromptsUseCase {
                sink: self.sink.clone(),
            },
            &self.ctx,
        )
        .await
        {
            error!("Unable to refresh prompts this tick. Error: {:?}", e);
        }
    }
}

/// Runs scheduling ticks forever at the configured interval.
pub fn start_sync_job(runner: Arc<SyncJobRunner>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(runner.ctx.config.sync_interval);
        loop {
            interval.tick().await;
            runner.run_tick().await;
        }
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use anyhow::anyhow;
    use tickler_domain::{FeedSubscription, PromptHandle, RenderedPrompt};
    use tickler_infra::{FeedPage, FeedPageQuery, FeedProviderError};

    struct EmptyProvider;

    #[async_trait::async_trait]
    impl IFeedProvider for EmptyProvider {
        async fn fetch_page(
            &self,
            _owner_id: &str,
            _feed_id: &str,
            _query: &FeedPageQuery,
        ) -> Result<FeedPage, FeedProviderError> {
            Ok(FeedPage {
                items: vec![],
                next_page_token: None,
                next_sync_token: None,
            })
        }
    }

    struct NoopSink;

    #[async_trait::async_trait]
    impl IPromptSink for NoopSink {
        async fn send(&self, _prompt: &RenderedPrompt) -> anyhow::Result<PromptHandle> {
            Err(anyhow!("no delivery in tests"))
        }

        async fn edit(&self, _handle: &PromptHandle, _prompt: &RenderedPrompt) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn runner() -> SyncJobRunner {
        SyncJobRunner::new(
            TicklerContext::create_inmemory(),
            Arc::new(EmptyProvider),
            Arc::new(NoopSink),
        )
    }

    #[test]
    fn in_flight_guard_skips_busy_feed_until_finished() {
        let runner = runner();
        assert!(runner.try_begin("feed-1"));
        assert!(!runner.try_begin("feed-1"));
        assert!(runner.try_begin("feed-2"));

        runner.finish("feed-1");
        assert!(runner.try_begin("feed-1"));
    }

    #[tokio::test]
    async fn tick_updates_cursors_for_all_subscribed_feeds() {
        let runner = runner();
        for feed_id in ["feed-1", "feed-2"] {
            runner
                .ctx
                .repos
                .feed_subscriptions
                .insert(&FeedSubscription {
                    owner_id: "owner-1".into(),
                    feed_id: feed_id.into(),
                    display_name: feed_id.into(),
                })
                .await
                .unwrap();
        }

        runner.run_tick().await;

        // Provider issued no terminal token, so no cursor was written,
        // but the tick visited both feeds without getting stuck.
        assert!(runner.in_flight.lock().unwrap().is_empty());
        assert!(runner.ctx.repos.sync_cursors.find("feed-1").await.is_none());
    }
}
