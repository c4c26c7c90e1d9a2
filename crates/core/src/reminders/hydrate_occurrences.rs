use chrono::Duration;
use tickler_domain::date::{
    add_days, day_in_zone, days_inclusive, instant_in_zone, time_parts_in_zone, utc_day_range,
};
use tickler_domain::{best_match, EventRecord, ReminderOccurrence, ReminderRule, ID};
use tickler_infra::TicklerContext;
use tracing::info;

use crate::shared::usecase::UseCase;

/// Reconciles the occurrence table against the mirrored events and the
/// current rule set. Runs over every upcoming event inside the lookahead
/// window rather than just the latest sync's deltas, so rules added
/// after an event was mirrored still take effect.
#[derive(Debug)]
pub struct HydrateOccurrencesUseCase;

#[derive(Debug, Default, PartialEq)]
pub struct HydrationReport {
    pub created: usize,
    pub refreshed: usize,
    pub swept: i64,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

#[async_trait::async_trait]
impl UseCase for HydrateOccurrencesUseCase {
    type Response = HydrationReport;
    type Error = UseCaseError;

    const NAME: &'static str = "HydrateOccurrences";

    async fn execute(&mut self, ctx: &TicklerContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.now();
        let rules = ctx.repos.reminder_rules.find_all().await;

        // Sweep rows whose rule was removed. An empty rule set clears the
        // whole table.
        let rule_ids = rules.iter().map(|r| r.id.clone()).collect::<Vec<ID>>();
        let swept = ctx
            .repos
            .reminder_occurrences
            .delete_orphaned(&rule_ids)
            .await;
        if swept.deleted_count > 0 {
            info!("Swept {} occurrences of removed rules", swept.deleted_count);
        }

        let mut report = HydrationReport {
            swept: swept.deleted_count,
            ..Default::default()
        };
        if rules.is_empty() {
            return Ok(report);
        }

        let events = ctx
            .repos
            .events
            .find_in_window(now - Duration::days(1), now + ctx.config.hydration_lookahead)
            .await;

        for event in events {
            let rule = match best_match(&event.summary, &rules) {
                Some(rule) => rule,
                None => continue,
            };
            self.hydrate_event(ctx, &event, rule, &mut report).await?;
        }

        Ok(report)
    }
}

impl HydrateOccurrencesUseCase {
    /// One occurrence per calendar day the event spans, keyed by
    /// (rule, feed, item, occurrence_start). All-day events anchor to UTC
    /// dates, timed events to the reminder zone.
    async fn hydrate_event(
        &self,
        ctx: &TicklerContext,
        event: &EventRecord,
        rule: &ReminderRule,
        report: &mut HydrationReport,
    ) -> Result<(), UseCaseError> {
        let tz = ctx.config.reminder_timezone;

        let days = if event.is_all_day {
            // Stored as UTC midnights with an exclusive end date
            let start_day = event.start.date_naive();
            let end_day = add_days(event.end.date_naive(), -1).max(start_day);
            days_inclusive(start_day, end_day)
        } else {
            days_inclusive(day_in_zone(event.start, tz), day_in_zone(event.end, tz))
        };
        let single_day = days.len() == 1;

        for day in days {
            let (occurrence_start, day_start, day_end) = if event.is_all_day {
                let (day_start, day_end) = utc_day_range(day);
                (day_start, day_start, day_end)
            } else {
                let (hour, minute) = time_parts_in_zone(event.start, tz);
                (
                    instant_in_zone(day, hour, minute, tz),
                    instant_in_zone(day, 0, 0, tz),
                    instant_in_zone(add_days(day, 1), 0, 0, tz),
                )
            };

            let reminder_at = if event.is_all_day {
                instant_in_zone(
                    add_days(day, -rule.reminder_days),
                    ctx.config.all_day_reference_hour,
                    0,
                    tz,
                )
            } else {
                occurrence_start - Duration::days(rule.reminder_days)
            };

            // Same-day cleanup: rows left behind by a time shift within
            // the day, then rows owned by a previously matching rule.
            ctx.repos
                .reminder_occurrences
                .delete_day_shifted(
                    &event.feed_id,
                    &event.item_id,
                    day_start,
                    day_end,
                    occurrence_start,
                )
                .await;
            ctx.repos
                .reminder_occurrences
                .delete_other_rules(&event.feed_id, &event.item_id, occurrence_start, &rule.id)
                .await;

            let existing = ctx
                .repos
                .reminder_occurrences
                .find_by_natural_key(&rule.id, &event.feed_id, &event.item_id, occurrence_start)
                .await;
            match existing {
                Some(existing) => {
                    if existing.completed_at.is_none() && existing.reminder_at != reminder_at {
                        ctx.repos
                            .reminder_occurrences
                            .set_reminder_at(&existing.id, reminder_at)
                            .await
                            .map_err(|_| UseCaseError::StorageError)?;
                        report.refreshed += 1;
                    }
                }
                None => {
                    let occurrence = ReminderOccurrence {
                        id: ID::default(),
                        rule_id: rule.id.clone(),
                        feed_id: event.feed_id.clone(),
                        item_id: event.item_id.clone(),
                        occurrence_start,
                        occurrence_end: if single_day && !event.is_all_day {
                            Some(event.end)
                        } else {
                            None
                        },
                        summary: event.summary.clone(),
                        reminder_at,
                        is_all_day: event.is_all_day,
                        arrangements_required: rule.arrangements_required,
                        arrangements_notes: None,
                        completed_at: None,
                        last_prompt_at: None,
                        snoozed_until: None,
                        prompt_handle: None,
                    };
                    ctx.repos
                        .reminder_occurrences
                        .insert(&occurrence)
                        .await
                        .map_err(|_| UseCaseError::StorageError)?;
                    report.created += 1;
                }
            }
        }

        Ok(())
    }
}
