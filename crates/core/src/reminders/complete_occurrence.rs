use tickler_domain::{normalize_arrangement_notes, ReminderOccurrence, ID};
use tickler_infra::TicklerContext;

use crate::shared::usecase::UseCase;

/// External acknowledgement. Sets the terminal `completed_at` and
/// optionally stores normalized arrangement notes. Acknowledging an
/// already completed occurrence is a no-op, racing acknowledgements both
/// succeed.
#[derive(Debug)]
pub struct CompleteOccurrenceUseCase {
    pub occurrence_id: ID,
    pub notes: Option<String>,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound,
    StorageError,
}

#[async_trait::async_trait]
impl UseCase for CompleteOccurrenceUseCase {
    type Response = ReminderOccurrence;
    type Error = UseCaseError;

    const NAME: &'static str = "CompleteOccurrence";

    async fn execute(&mut self, ctx: &TicklerContext) -> Result<Self::Response, Self::Error> {
        let occurrence = ctx
            .repos
            .reminder_occurrences
            .find(&self.occurrence_id)
            .await
            .ok_or(UseCaseError::NotFound)?;
        if occurrence.completed_at.is_some() {
            return Ok(occurrence);
        }

        let notes = self
            .notes
            .as_deref()
            .and_then(normalize_arrangement_notes);
        ctx.repos
            .reminder_occurrences
            .complete(&self.occurrence_id, ctx.sys.now(), notes.as_deref())
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        ctx.repos
            .reminder_occurrences
            .find(&self.occurrence_id)
            .await
            .ok_or(UseCaseError::NotFound)
    }
}
