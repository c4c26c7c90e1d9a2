use tickler_domain::{normalize_arrangement_notes, ReminderOccurrence, ID};
use tickler_infra::TicklerContext;

use crate::shared::usecase::UseCase;

/// Edits the free-text arrangement notes on an occurrence. This is the
/// one mutation allowed after completion, blank input clears the notes.
#[derive(Debug)]
pub struct UpdateArrangementNotesUseCase {
    pub occurrence_id: ID,
    pub notes: String,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound,
    StorageError,
}

#[async_trait::async_trait]
impl UseCase for UpdateArrangementNotesUseCase {
    type Response = ReminderOccurrence;
    type Error = UseCaseError;

    const NAME: &'static str = "UpdateArrangementNotes";

    async fn execute(&mut self, ctx: &TicklerContext) -> Result<Self::Response, Self::Error> {
        ctx.repos
            .reminder_occurrences
            .find(&self.occurrence_id)
            .await
            .ok_or(UseCaseError::NotFound)?;

        let notes = normalize_arrangement_notes(&self.notes);
        ctx.repos
            .reminder_occurrences
            .set_arrangements_notes(&self.occurrence_id, notes.as_deref())
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        ctx.repos
            .reminder_occurrences
            .find(&self.occurrence_id)
            .await
            .ok_or(UseCaseError::NotFound)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{Duration, Utc};

    async fn insert_completed(ctx: &TicklerContext) -> ReminderOccurrence {
        let now = Utc::now();
        let occurrence = ReminderOccurrence {
            id: ID::default(),
            rule_id: ID::default(),
            feed_id: "feed-1".into(),
            item_id: "ev-1".into(),
            occurrence_start: now + Duration::days(2),
            occurrence_end: None,
            summary: "Dentist appointment".into(),
            reminder_at: now - Duration::hours(1),
            is_all_day: false,
            arrangements_required: true,
            arrangements_notes: Some("booked cab".into()),
            completed_at: Some(now),
            last_prompt_at: Some(now),
            snoozed_until: None,
            prompt_handle: None,
        };
        ctx.repos
            .reminder_occurrences
            .insert(&occurrence)
            .await
            .unwrap();
        occurrence
    }

    #[tokio::test]
    async fn notes_can_be_edited_after_completion() {
        let ctx = TicklerContext::create_inmemory();
        let occurrence = insert_completed(&ctx).await;

        let updated = UpdateArrangementNotesUseCase {
            occurrence_id: occurrence.id.clone(),
            notes: " cab  and  sitter ".into(),
        }
        .execute(&ctx)
        .await
        .unwrap();
        assert_eq!(updated.arrangements_notes, Some("cab and sitter".into()));
        assert!(updated.completed_at.is_some());
    }

    #[tokio::test]
    async fn blank_input_clears_the_notes() {
        let ctx = TicklerContext::create_inmemory();
        let occurrence = insert_completed(&ctx).await;

        let updated = UpdateArrangementNotesUseCase {
            occurrence_id: occurrence.id.clone(),
            notes: "   ".into(),
        }
        .execute(&ctx)
        .await
        .unwrap();
        assert_eq!(updated.arrangements_notes, None);
    }
}
