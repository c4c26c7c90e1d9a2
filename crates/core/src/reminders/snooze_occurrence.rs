use tickler_domain::{ReminderOccurrence, ID};
use tickler_infra::TicklerContext;

use crate::shared::usecase::UseCase;

/// External snooze action on a prompted occurrence. Defers re-selection
/// by the configured snooze duration.
#[derive(Debug)]
pub struct SnoozeOccurrenceUseCase {
    pub occurrence_id: ID,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound,
    AlreadyCompleted,
    StorageError,
}

#[async_trait::async_trait]
impl UseCase for SnoozeOccurrenceUseCase {
    type Response = ReminderOccurrence;
    type Error = UseCaseError;

    const NAME: &'static str = "SnoozeOccurrence";

    async fn execute(&mut self, ctx: &TicklerContext) -> Result<Self::Response, Self::Error> {
        let occurrence = ctx
            .repos
            .reminder_occurrences
            .find(&self.occurrence_id)
            .await
            .ok_or(UseCaseError::NotFound)?;
        if occurrence.completed_at.is_some() {
            return Err(UseCaseError::AlreadyCompleted);
        }

        let now = ctx.sys.now();
        ctx.repos
            .reminder_occurrences
            .snooze(&self.occurrence_id, now, now + ctx.config.snooze_duration)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        ctx.repos
            .reminder_occurrences
            .find(&self.occurrence_id)
            .await
            .ok_or(UseCaseError::NotFound)
    }
}
