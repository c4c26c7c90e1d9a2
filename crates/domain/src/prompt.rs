use chrono_tz::Tz;

use crate::date::day_in_zone;
use crate::occurrence::ReminderOccurrence;
use crate::rule::ReminderRule;

/// Surface-neutral rendering of a reminder prompt. The delivery layer
/// decides how to present it; the engine only decides the content.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPrompt {
    pub title: String,
    pub body: String,
    /// Whether the prompt should offer acknowledge/snooze actions.
    pub actionable: bool,
}

fn when_line(occurrence: &ReminderOccurrence, tz: Tz) -> String {
    if occurrence.is_all_day {
        // All-day occurrences are anchored to UTC calendar dates
        let day = day_in_zone(occurrence.occurrence_start, chrono_tz::UTC);
        format!("When: {}", day.format("%A, %B %e %Y"))
    } else {
        let local = occurrence.occurrence_start.with_timezone(&tz);
        format!("When: {}", local.format("%A, %B %e %Y at %H:%M %Z"))
    }
}

fn body_lines(
    occurrence: &ReminderOccurrence,
    rule: Option<&ReminderRule>,
    tz: Tz,
    footer: Option<&str>,
) -> String {
    let summary = if occurrence.summary.is_empty() {
        "(No title)"
    } else {
        occurrence.summary.as_str()
    };
    let mut lines = vec![format!("Event: {}", summary), when_line(occurrence, tz)];

    let targets = rule.map(|r| r.notify_targets.as_slice()).unwrap_or(&[]);
    if !targets.is_empty() {
        lines.push(format!("Affects: {}", targets.join(" ")));
    }
    if let Some(notes) = occurrence.arrangements_notes.as_deref() {
        lines.push(format!("Note: {}", notes));
    }
    if let Some(footer) = footer {
        lines.push(String::new());
        lines.push(footer.to_string());
    }
    lines.join("\n")
}

impl RenderedPrompt {
    pub fn prompt(occurrence: &ReminderOccurrence, rule: Option<&ReminderRule>, tz: Tz) -> Self {
        let footer = occurrence
            .arrangements_required
            .then_some("Arrangements needed: please confirm when done.");
        Self {
            title: "Reminder".to_string(),
            body: body_lines(occurrence, rule, tz, footer),
            actionable: occurrence.arrangements_required,
        }
    }

    pub fn confirmed(occurrence: &ReminderOccurrence, rule: Option<&ReminderRule>, tz: Tz) -> Self {
        let footer = (occurrence.arrangements_required
            && occurrence.arrangements_notes.is_none())
        .then_some("Arrangements confirmed.");
        Self {
            title: "Reminder".to_string(),
            body: body_lines(occurrence, rule, tz, footer),
            actionable: false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use chrono_tz::America::New_York;

    fn occurrence() -> ReminderOccurrence {
        let start = Utc.with_ymd_and_hms(2026, 3, 10, 14, 0, 0).unwrap();
        ReminderOccurrence {
            id: Default::default(),
            rule_id: Default::default(),
            feed_id: "feed-1".into(),
            item_id: "item-1".into(),
            occurrence_start: start,
            occurrence_end: None,
            summary: "Dentist appointment".into(),
            reminder_at: start - Duration::days(2),
            is_all_day: false,
            arrangements_required: true,
            arrangements_notes: None,
            completed_at: None,
            last_prompt_at: None,
            snoozed_until: None,
            prompt_handle: None,
        }
    }

    #[test]
    fn prompt_for_arrangements_is_actionable() {
        let rendered = RenderedPrompt::prompt(&occurrence(), None, New_York);
        assert!(rendered.actionable);
        assert!(rendered.body.contains("Event: Dentist appointment"));
        assert!(rendered.body.contains("Arrangements needed"));
    }

    #[test]
    fn confirmed_variant_is_not_actionable() {
        let mut occ = occurrence();
        occ.completed_at = Some(Utc::now());
        let rendered = RenderedPrompt::confirmed(&occ, None, New_York);
        assert!(!rendered.actionable);
        assert!(rendered.body.contains("Arrangements confirmed."));
    }

    #[test]
    fn notes_replace_the_confirmed_footer() {
        let mut occ = occurrence();
        occ.completed_at = Some(Utc::now());
        occ.arrangements_notes = Some("booked cab".into());
        let rendered = RenderedPrompt::confirmed(&occ, None, New_York);
        assert!(rendered.body.contains("Note: booked cab"));
        assert!(!rendered.body.contains("Arrangements confirmed."));
    }

    #[test]
    fn timed_when_line_uses_the_reminder_zone() {
        let rendered = RenderedPrompt::prompt(&occurrence(), None, New_York);
        // 14:00 UTC is 10:00 in New York in March (EDT)
        assert!(rendered.body.contains("at 10:00"));
    }
}
