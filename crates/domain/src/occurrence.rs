use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::entity::{Entity, ID};

/// Opaque handle to a delivered prompt, as issued by the prompt sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptHandle(String);

impl PromptHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Derived lifecycle position of an occurrence. Not stored; computed
/// from the prompt/snooze/completion timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccurrenceState {
    Pending,
    Prompted,
    Snoozed,
    Completed,
}

/// One calendar-day instance of a rule matching an event, unique by
/// (rule_id, feed_id, item_id, occurrence_start).
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderOccurrence {
    pub id: ID,
    pub rule_id: ID,
    pub feed_id: String,
    pub item_id: String,
    pub occurrence_start: DateTime<Utc>,
    pub occurrence_end: Option<DateTime<Utc>>,
    pub summary: String,
    pub reminder_at: DateTime<Utc>,
    pub is_all_day: bool,
    pub arrangements_required: bool,
    pub arrangements_notes: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub last_prompt_at: Option<DateTime<Utc>>,
    pub snoozed_until: Option<DateTime<Utc>>,
    pub prompt_handle: Option<PromptHandle>,
}

impl Entity for ReminderOccurrence {
    fn id(&self) -> &ID {
        &self.id
    }
}

impl ReminderOccurrence {
    pub fn state(&self, now: DateTime<Utc>) -> OccurrenceState {
        if self.completed_at.is_some() {
            return OccurrenceState::Completed;
        }
        if let Some(snoozed_until) = self.snoozed_until {
            if snoozed_until > now {
                return OccurrenceState::Snoozed;
            }
        }
        if self.last_prompt_at.is_some() {
            return OccurrenceState::Prompted;
        }
        OccurrenceState::Pending
    }

    /// Whether the occurrence start lies behind `now`. All-day starts are
    /// compared at day granularity (UTC), timed starts at instant
    /// granularity.
    pub fn start_has_passed(&self, now: DateTime<Utc>) -> bool {
        if self.is_all_day {
            self.occurrence_start.date_naive() < now.date_naive()
        } else {
            self.occurrence_start < now
        }
    }

    /// The selection predicate evaluated on every scheduling tick:
    /// not completed, reminder time reached, snooze expired, start not
    /// passed, inside the arrangement ping window when arrangements are
    /// required, and past the hard per-day prompt throttle.
    pub fn is_due(&self, now: DateTime<Utc>, ping_window: Duration, throttle: Duration) -> bool {
        if self.completed_at.is_some() {
            return false;
        }
        if self.reminder_at > now {
            return false;
        }
        if let Some(snoozed_until) = self.snoozed_until {
            if snoozed_until > now {
                return false;
            }
        }
        if self.start_has_passed(now) {
            return false;
        }
        if self.arrangements_required && self.occurrence_start > now + ping_window {
            return false;
        }
        if let Some(last_prompt_at) = self.last_prompt_at {
            if last_prompt_at > now - throttle {
                return false;
            }
        }
        true
    }
}

/// Collapses whitespace runs in free-text arrangement notes; empty input
/// clears the notes.
pub fn normalize_arrangement_notes(value: &str) -> Option<String> {
    let normalized = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    fn occurrence(now: DateTime<Utc>) -> ReminderOccurrence {
        ReminderOccurrence {
            id: Default::default(),
            rule_id: Default::default(),
            feed_id: "feed-1".into(),
            item_id: "item-1".into(),
            occurrence_start: now + Duration::hours(12),
            occurrence_end: None,
            summary: "Dentist appointment".into(),
            reminder_at: now - Duration::hours(1),
            is_all_day: false,
            arrangements_required: false,
            arrangements_notes: None,
            completed_at: None,
            last_prompt_at: None,
            snoozed_until: None,
            prompt_handle: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 8, 10, 0, 0).unwrap()
    }

    fn ping_window() -> Duration {
        Duration::days(3)
    }

    fn throttle() -> Duration {
        Duration::days(1)
    }

    #[test]
    fn due_when_reminder_reached_and_untouched() {
        let occ = occurrence(now());
        assert!(occ.is_due(now(), ping_window(), throttle()));
        assert_eq!(occ.state(now()), OccurrenceState::Pending);
    }

    #[test]
    fn recent_prompt_throttles_redelivery() {
        let mut occ = occurrence(now());
        occ.last_prompt_at = Some(now() - Duration::hours(1));
        assert!(!occ.is_due(now(), ping_window(), throttle()));

        occ.last_prompt_at = Some(now() - Duration::days(1) - Duration::minutes(1));
        assert!(occ.is_due(now(), ping_window(), throttle()));
    }

    #[test]
    fn snooze_defers_selection_until_expiry() {
        let mut occ = occurrence(now());
        occ.snoozed_until = Some(now() + Duration::hours(2));
        assert!(!occ.is_due(now(), ping_window(), throttle()));
        assert_eq!(occ.state(now()), OccurrenceState::Snoozed);

        occ.snoozed_until = Some(now() - Duration::minutes(1));
        assert!(occ.is_due(now(), ping_window(), throttle()));
    }

    #[test]
    fn completed_is_terminal() {
        let mut occ = occurrence(now());
        occ.completed_at = Some(now());
        assert!(!occ.is_due(now(), ping_window(), throttle()));
        assert_eq!(occ.state(now()), OccurrenceState::Completed);
    }

    #[test]
    fn arrangements_wait_for_ping_window() {
        let mut occ = occurrence(now());
        occ.arrangements_required = true;
        occ.occurrence_start = now() + Duration::days(5);
        assert!(!occ.is_due(now(), ping_window(), throttle()));

        occ.occurrence_start = now() + Duration::days(2);
        assert!(occ.is_due(now(), ping_window(), throttle()));
    }

    #[test]
    fn all_day_start_passes_at_day_granularity() {
        let mut occ = occurrence(now());
        occ.is_all_day = true;
        // Started earlier the same UTC day: still selectable
        occ.occurrence_start = now() - Duration::hours(5);
        assert!(occ.is_due(now(), ping_window(), throttle()));
        // Previous UTC day: gone
        occ.occurrence_start = now() - Duration::days(1);
        assert!(!occ.is_due(now(), ping_window(), throttle()));
    }

    #[test]
    fn timed_start_passes_at_instant_granularity() {
        let mut occ = occurrence(now());
        occ.occurrence_start = now() - Duration::minutes(1);
        assert!(!occ.is_due(now(), ping_window(), throttle()));
    }

    #[test]
    fn notes_normalization_collapses_whitespace() {
        assert_eq!(
            normalize_arrangement_notes("  booked\n  cab "),
            Some("booked cab".into())
        );
        assert_eq!(normalize_arrangement_notes("   "), None);
    }
}
