use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::event::EventStatus;

/// One remote calendar an owner has chosen to mirror locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedSubscription {
    pub owner_id: String,
    pub feed_id: String,
    pub display_name: String,
}

/// Opaque continuation token handed out by a feed provider. The engine
/// only stores and forwards it, never inspects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncToken(String);

impl SyncToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Incremental sync baseline for one feed. An absent token means the next
/// sync pass has to perform a windowed full fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncCursor {
    pub feed_id: String,
    pub token: Option<SyncToken>,
    pub last_synced_at: DateTime<Utc>,
}

/// When a feed item takes place. All-day items carry date-only endpoints
/// with an exclusive end date, timed items absolute instants.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedItemWhen {
    AllDay {
        start: NaiveDate,
        end: NaiveDate,
    },
    Timed {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// One changed item from a feed change page.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedItem {
    pub id: String,
    pub status: EventStatus,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub html_link: Option<String>,
    pub when: Option<FeedItemWhen>,
}

impl FeedItem {
    pub fn is_cancelled(&self) -> bool {
        self.status == EventStatus::Cancelled
    }
}
