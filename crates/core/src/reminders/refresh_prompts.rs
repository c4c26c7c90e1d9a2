use std::sync::Arc;

use tickler_domain::RenderedPrompt;
use tickler_infra::{IPromptSink, TicklerContext};
use tracing::warn;

use crate::shared::usecase::UseCase;

/// Re-renders every occurrence that still has a live prompt handle, so a
/// delivered message reflects the current notes and completion status.
/// Read-only on occurrence state.
pub struct RefreshPromptsUseCase {
    pub sink: Arc<dyn IPromptSink>,
}

impl std::fmt::Debug for RefreshPromptsUseCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshPromptsUseCase").finish()
    }
}

#[derive(Debug)]
pub enum UseCaseError {}

#[async_trait::async_trait]
impl UseCase for RefreshPromptsUseCase {
    type Response = usize;
    type Error = UseCaseError;

    const NAME: &'static str = "RefreshPrompts";

    async fn execute(&mut self, ctx: &TicklerContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.now();
        let active = ctx.repos.reminder_occurrences.find_active_prompts(now).await;

        let mut refreshed = 0;
        for occurrence in active {
            let handle = match &occurrence.prompt_handle {
                Some(handle) => handle.clone(),
                None => continue,
            };
            let rule = ctx.repos.reminder_rules.find(&occurrence.rule_id).await;
            let prompt = if occurrence.completed_at.is_some() {
                RenderedPrompt::confirmed(&occurrence, rule.as_ref(), ctx.config.reminder_timezone)
            } else {
                RenderedPrompt::prompt(&occurrence, rule.as_ref(), ctx.config.reminder_timezone)
            };

            if let Err(e) = self.sink.edit(&handle, &prompt).await {
                warn!(
                    "Unable to refresh prompt for occurrence: {}. Error: {:?}",
                    occurrence.id, e
                );
                continue;
            }
            refreshed += 1;
        }

        Ok(refreshed)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::sync::Mutex;
    use tickler_domain::{PromptHandle, ReminderOccurrence, ID};
    use tickler_infra::ISys;

    struct FixedSys(DateTime<Utc>);
    impl ISys for FixedSys {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 8, 10, 0, 0).unwrap()
    }

    fn ctx() -> TicklerContext {
        let mut ctx = TicklerContext::create_inmemory();
        ctx.sys = Arc::new(FixedSys(now()));
        ctx
    }

    #[derive(Default)]
    struct EditRecordingSink {
        edits: Mutex<Vec<(PromptHandle, RenderedPrompt)>>,
    }

    #[async_trait::async_trait]
    impl IPromptSink for EditRecordingSink {
        async fn send(&self, _prompt: &RenderedPrompt) -> anyhow::Result<PromptHandle> {
            Ok(PromptHandle::new("msg-1"))
        }

        async fn edit(&self, handle: &PromptHandle, prompt: &RenderedPrompt) -> anyhow::Result<()> {
            self.edits
                .lock()
                .unwrap()
                .push((handle.clone(), prompt.clone()));
            Ok(())
        }
    }

    async fn insert_prompted(ctx: &TicklerContext, start_offset: Duration) -> ReminderOccurrence {
        let occurrence = ReminderOccurrence {
            id: ID::default(),
            rule_id: ID::default(),
            feed_id: "feed-1".into(),
            item_id: "ev-1".into(),
            occurrence_start: now() + start_offset,
            occurrence_end: None,
            summary: "Dentist appointment".into(),
            reminder_at: now() - Duration::days(1),
            is_all_day: false,
            arrangements_required: true,
            arrangements_notes: None,
            completed_at: None,
            last_prompt_at: Some(now() - Duration::hours(2)),
            snoozed_until: None,
            prompt_handle: Some(PromptHandle::new("msg-1")),
        };
        ctx.repos
            .reminder_occurrences
            .insert(&occurrence)
            .await
            .unwrap();
        occurrence
    }

    #[tokio::test]
    async fn re_renders_live_prompts_with_current_state() {
        let ctx = ctx();
        let occurrence = insert_prompted(&ctx, Duration::days(2)).await;
        ctx.repos
            .reminder_occurrences
            .complete(&occurrence.id, now(), Some("booked cab"))
            .await
            .unwrap();
        let sink = Arc::new(EditRecordingSink::default());

        let refreshed = RefreshPromptsUseCase { sink: sink.clone() }
            .execute(&ctx)
            .await
            .unwrap();
        assert_eq!(refreshed, 1);

        let edits = sink.edits.lock().unwrap();
        assert_eq!(edits[0].0, PromptHandle::new("msg-1"));
        assert!(edits[0].1.body.contains("booked cab"));
        assert!(!edits[0].1.actionable);
    }

    #[tokio::test]
    async fn passed_occurrences_are_left_alone() {
        let ctx = ctx();
        insert_prompted(&ctx, Duration::days(-2)).await;
        let sink = Arc::new(EditRecordingSink::default());

        let refreshed = RefreshPromptsUseCase { sink: sink.clone() }
            .execute(&ctx)
            .await
            .unwrap();
        assert_eq!(refreshed, 0);
        assert!(sink.edits.lock().unwrap().is_empty());
    }
}
