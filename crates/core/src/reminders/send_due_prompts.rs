use std::sync::Arc;

use tickler_domain::RenderedPrompt;
use tickler_infra::{IPromptSink, TicklerContext};
use tracing::warn;

use crate::shared::usecase::UseCase;

/// Selects every due occurrence and delivers a prompt for it. Delivery
/// failures are swallowed per occurrence: nothing is recorded, so the row
/// stays selectable on the next tick.
pub struct SendDuePromptsUseCase {
    pub sink: Arc<dyn IPromptSink>,
}

impl std::fmt::Debug for SendDuePromptsUseCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendDuePromptsUseCase").finish()
    }
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

#[async_trait::async_trait]
impl UseCase for SendDuePromptsUseCase {
    type Response = usize;
    type Error = UseCaseError;

    const NAME: &'static str = "SendDuePrompts";

    async fn execute(&mut self, ctx: &TicklerContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.now();
        let due = ctx
            .repos
            .reminder_occurrences
            .find_due(
                now,
                ctx.config.arrangement_ping_window,
                ctx.config.prompt_throttle,
            )
            .await;

        let mut delivered = 0;
        for occurrence in due {
            let rule = ctx.repos.reminder_rules.find(&occurrence.rule_id).await;
            let prompt =
                RenderedPrompt::prompt(&occurrence, rule.as_ref(), ctx.config.reminder_timezone);

            let handle = match self.sink.send(&prompt).await {
                Ok(handle) => handle,
                Err(e) => {
                    warn!(
                        "Unable to deliver prompt for occurrence: {}. Error: {:?}",
                        occurrence.id, e
                    );
                    continue;
                }
            };

            if occurrence.arrangements_required {
                // Self-snooze until acknowledged, re-prompted after expiry
                ctx.repos
                    .reminder_occurrences
                    .mark_prompt_sent(
                        &occurrence.id,
                        &handle,
                        now,
                        Some(now + ctx.config.snooze_duration),
                    )
                    .await
                    .map_err(|_| UseCaseError::StorageError)?;
            } else {
                // Informational prompt, nothing to acknowledge
                ctx.repos
                    .reminder_occurrences
                    .mark_prompt_sent(&occurrence.id, &handle, now, None)
                    .await
                    .map_err(|_| UseCaseError::StorageError)?;
                ctx.repos
                    .reminder_occurrences
                    .complete(&occurrence.id, now, None)
                    .await
                    .map_err(|_| UseCaseError::StorageError)?;
            }
            delivered += 1;
        }

        Ok(delivered)
    }
}
