mod event;
mod feed_subscription;
mod reminder_occurrence;
mod reminder_rule;
mod shared;
mod sync_cursor;

use event::{InMemoryEventRepo, PostgresEventRepo};
use feed_subscription::{InMemoryFeedSubscriptionRepo, PostgresFeedSubscriptionRepo};
use reminder_occurrence::{InMemoryReminderOccurrenceRepo, PostgresReminderOccurrenceRepo};
use reminder_rule::{InMemoryReminderRuleRepo, PostgresReminderRuleRepo};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use sync_cursor::{InMemorySyncCursorRepo, PostgresSyncCursorRepo};
use tracing::info;

pub use event::IEventRepo;
pub use feed_subscription::IFeedSubscriptionRepo;
pub use reminder_occurrence::IReminderOccurrenceRepo;
pub use reminder_rule::IReminderRuleRepo;
pub use sync_cursor::ISyncCursorRepo;

#[derive(Clone)]
pub struct Repos {
    pub feed_subscriptions: Arc<dyn IFeedSubscriptionRepo>,
    pub sync_cursors: Arc<dyn ISyncCursorRepo>,
    pub events: Arc<dyn IEventRepo>,
    pub reminder_rules: Arc<dyn IReminderRuleRepo>,
    pub reminder_occurrences: Arc<dyn IReminderOccurrenceRepo>,
}

impl Repos {
    pub async fn create_postgres(
        connection_string: &str,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");

        Ok(Self {
            feed_subscriptions: Arc::new(PostgresFeedSubscriptionRepo::new(pool.clone())),
            sync_cursors: Arc::new(PostgresSyncCursorRepo::new(pool.clone())),
            events: Arc::new(PostgresEventRepo::new(pool.clone())),
            reminder_rules: Arc::new(PostgresReminderRuleRepo::new(pool.clone())),
            reminder_occurrences: Arc::new(PostgresReminderOccurrenceRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            feed_subscriptions: Arc::new(InMemoryFeedSubscriptionRepo::new()),
            sync_cursors: Arc::new(InMemorySyncCursorRepo::new()),
            events: Arc::new(InMemoryEventRepo::new()),
            reminder_rules: Arc::new(InMemoryReminderRuleRepo::new()),
            reminder_occurrences: Arc::new(InMemoryReminderOccurrenceRepo::new()),
        }
    }
}
