use anyhow::anyhow;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tickler_domain::{EventStatus, FeedItem, FeedItemWhen};
use tracing::error;

use crate::services::feed_provider::{FeedPageQuery, FeedProviderError};

const GOOGLE_API_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";
const MAX_RESULTS_PER_PAGE: usize = 250;

/// Start or end of a Google event. All-day events carry `date`, timed
/// events carry `date_time`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEventDateTime {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub date_time: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEventResource {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub html_link: Option<String>,
    #[serde(default)]
    pub start: Option<GoogleEventDateTime>,
    #[serde(default)]
    pub end: Option<GoogleEventDateTime>,
}

impl From<GoogleEventResource> for FeedItem {
    fn from(e: GoogleEventResource) -> Self {
        let when = match (e.start, e.end) {
            (
                Some(GoogleEventDateTime {
                    date: Some(start), ..
                }),
                Some(GoogleEventDateTime { date: Some(end), .. }),
            ) => Some(FeedItemWhen::AllDay { start, end }),
            (
                Some(GoogleEventDateTime {
                    date_time: Some(start),
                    ..
                }),
                Some(GoogleEventDateTime {
                    date_time: Some(end),
                    ..
                }),
            ) => Some(FeedItemWhen::Timed {
                start: start.with_timezone(&Utc),
                end: end.with_timezone(&Utc),
            }),
            _ => None,
        };
        Self {
            id: e.id,
            status: EventStatus::parse(e.status.as_deref().unwrap_or_default()),
            summary: e.summary,
            description: e.description,
            location: e.location,
            html_link: e.html_link,
            when,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEventsResponse {
    #[serde(default)]
    pub items: Vec<GoogleEventResource>,
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub next_sync_token: Option<String>,
}

pub struct GoogleCalendarRestApi {
    client: Client,
    access_token: String,
}

impl GoogleCalendarRestApi {
    pub fn new(access_token: String) -> Self {
        Self {
            client: Client::new(),
            access_token,
        }
    }

    /// `events.list` for one calendar. A stale sync token surfaces as
    /// HTTP 410 Gone and maps to `TokenInvalid`.
    pub async fn list_events(
        &self,
        calendar_id: &str,
        query: &FeedPageQuery,
    ) -> Result<ListEventsResponse, FeedProviderError> {
        let mut params: Vec<(&str, String)> = vec![
            ("singleEvents", "true".into()),
            ("maxResults", MAX_RESULTS_PER_PAGE.to_string()),
        ];
        match &query.sync_token {
            Some(token) => params.push(("syncToken", token.as_str().to_string())),
            None => {
                if let Some(time_min) = query.time_min {
                    params.push(("timeMin", time_min.to_rfc3339()));
                }
            }
        }
        if let Some(page_token) = &query.page_token {
            params.push(("pageToken", page_token.clone()));
        }

        let res = self
            .client
            .get(&format!(
                "{}/calendars/{}/events",
                GOOGLE_API_BASE_URL, calendar_id
            ))
            .header("authorization", format!("Bearer {}", self.access_token))
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                error!(
                    "[Network Error] Google Calendar API GET error. Error message: {:?}",
                    e
                );
                FeedProviderError::Unavailable(anyhow::Error::new(e))
            })?;

        match res.status() {
            StatusCode::GONE => Err(FeedProviderError::TokenInvalid),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(FeedProviderError::AuthExpired),
            status if !status.is_success() => {
                error!(
                    "Google Calendar API returned unexpected status {} for calendar: {}",
                    status, calendar_id
                );
                Err(FeedProviderError::Unavailable(anyhow!(
                    "unexpected status code: {}",
                    status
                )))
            }
            _ => res.json::<ListEventsResponse>().await.map_err(|e| {
                error!(
                    "[Unexpected Response] Google Calendar API GET error. Error message: {:?}",
                    e
                );
                FeedProviderError::Unavailable(anyhow::Error::new(e))
            }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn all_day_resource_maps_to_date_span() {
        let json = r#"{
            "id": "ev-1",
            "status": "confirmed",
            "summary": "Dentist",
            "start": { "date": "2026-03-10" },
            "end": { "date": "2026-03-11" }
        }"#;
        let resource: GoogleEventResource = serde_json::from_str(json).unwrap();
        let item: FeedItem = resource.into();
        assert_eq!(
            item.when,
            Some(FeedItemWhen::AllDay {
                start: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
                end: NaiveDate::from_ymd_opt(2026, 3, 11).unwrap(),
            })
        );
    }

    #[test]
    fn timed_resource_converts_offset_to_utc() {
        let json = r#"{
            "id": "ev-2",
            "status": "confirmed",
            "summary": "Checkup",
            "start": { "dateTime": "2026-03-10T09:00:00-05:00" },
            "end": { "dateTime": "2026-03-10T10:00:00-05:00" }
        }"#;
        let resource: GoogleEventResource = serde_json::from_str(json).unwrap();
        let item: FeedItem = resource.into();
        assert_eq!(
            item.when,
            Some(FeedItemWhen::Timed {
                start: Utc.with_ymd_and_hms(2026, 3, 10, 14, 0, 0).unwrap(),
                end: Utc.with_ymd_and_hms(2026, 3, 10, 15, 0, 0).unwrap(),
            })
        );
    }

    #[test]
    fn cancelled_resource_without_when_is_kept() {
        let json = r#"{ "id": "ev-3", "status": "cancelled" }"#;
        let resource: GoogleEventResource = serde_json::from_str(json).unwrap();
        let item: FeedItem = resource.into();
        assert!(item.is_cancelled());
        assert_eq!(item.when, None);
    }
}
