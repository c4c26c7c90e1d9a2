use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::feed::{FeedItem, FeedItemWhen};

/// Storage caps for display text fields. Identifiers and timestamps are
/// never truncated.
pub const SUMMARY_MAX_LEN: usize = 1000;
pub const DESCRIPTION_MAX_LEN: usize = 4000;
pub const LOCATION_MAX_LEN: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Confirmed,
    Tentative,
    Cancelled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Tentative => "tentative",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "cancelled" => Self::Cancelled,
            "tentative" => Self::Tentative,
            _ => Self::Confirmed,
        }
    }
}

/// Local mirror of one feed item, unique by (feed_id, item_id).
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub feed_id: String,
    pub item_id: String,
    pub summary: String,
    pub description: String,
    pub location: String,
    pub status: EventStatus,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub is_all_day: bool,
    pub external_link: String,
    pub last_updated: DateTime<Utc>,
}

fn truncate(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

impl EventRecord {
    /// Normalizes a non-cancelled feed item into its stored form.
    /// Items without usable start/end information are dropped.
    pub fn from_feed_item(feed_id: &str, item: &FeedItem, now: DateTime<Utc>) -> Option<Self> {
        let (start, end, is_all_day) = match item.when.as_ref()? {
            FeedItemWhen::AllDay { start, end } => (
                Utc.from_utc_datetime(&start.and_time(NaiveTime::MIN)),
                Utc.from_utc_datetime(&end.and_time(NaiveTime::MIN)),
                true,
            ),
            FeedItemWhen::Timed { start, end } => (*start, *end, false),
        };

        Some(Self {
            feed_id: feed_id.to_string(),
            item_id: item.id.clone(),
            summary: truncate(item.summary.as_deref().unwrap_or(""), SUMMARY_MAX_LEN),
            description: truncate(
                item.description.as_deref().unwrap_or(""),
                DESCRIPTION_MAX_LEN,
            ),
            location: truncate(item.location.as_deref().unwrap_or(""), LOCATION_MAX_LEN),
            status: item.status,
            start,
            end,
            is_all_day,
            external_link: item.html_link.clone().unwrap_or_default(),
            last_updated: now,
        })
    }
}
