use super::IFeedSubscriptionRepo;
use sqlx::{FromRow, PgPool};
use tickler_domain::FeedSubscription;
use tracing::error;

pub struct PostgresFeedSubscriptionRepo {
    pool: PgPool,
}

impl PostgresFeedSubscriptionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct FeedSubscriptionRaw {
    owner_id: String,
    feed_id: String,
    display_name: String,
}

impl From<FeedSubscriptionRaw> for FeedSubscription {
    fn from(raw: FeedSubscriptionRaw) -> Self {
        Self {
            owner_id: raw.owner_id,
            feed_id: raw.feed_id,
            display_name: raw.display_name,
        }
    }
}

#[async_trait::async_trait]
impl IFeedSubscriptionRepo for PostgresFeedSubscriptionRepo {
    async fn insert(&self, subscription: &FeedSubscription) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO feed_subscriptions (owner_id, feed_id, display_name)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&subscription.owner_id)
        .bind(&subscription.feed_id)
        .bind(&subscription.display_name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, owner_id: &str, feed_id: &str) -> Option<FeedSubscription> {
        sqlx::query_as::<_, FeedSubscriptionRaw>(
            r#"
            SELECT * FROM feed_subscriptions
            WHERE owner_id = $1 AND feed_id = $2
            "#,
        )
        .bind(owner_id)
        .bind(feed_id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to find feed subscription: {:?}", e);
            None
        })
        .map(|raw| raw.into())
    }

    async fn find_all(&self) -> Vec<FeedSubscription> {
        sqlx::query_as::<_, FeedSubscriptionRaw>(
            r#"
            SELECT * FROM feed_subscriptions
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to list feed subscriptions: {:?}", e);
            Vec::new()
        })
        .into_iter()
        .map(|raw| raw.into())
        .collect()
    }

    async fn find_by_owner(&self, owner_id: &str) -> Vec<FeedSubscription> {
        sqlx::query_as::<_, FeedSubscriptionRaw>(
            r#"
            SELECT * FROM feed_subscriptions
            WHERE owner_id = $1
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to list feed subscriptions for owner: {:?}", e);
            Vec::new()
        })
        .into_iter()
        .map(|raw| raw.into())
        .collect()
    }

    async fn delete(&self, owner_id: &str, feed_id: &str) -> Option<FeedSubscription> {
        sqlx::query_as::<_, FeedSubscriptionRaw>(
            r#"
            DELETE FROM feed_subscriptions
            WHERE owner_id = $1 AND feed_id = $2
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(feed_id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to delete feed subscription: {:?}", e);
            None
        })
        .map(|raw| raw.into())
    }
}
