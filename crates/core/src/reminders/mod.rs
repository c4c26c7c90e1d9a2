mod complete_occurrence;
mod hydrate_occurrences;
mod refresh_prompts;
mod send_due_prompts;
mod snooze_occurrence;
mod update_arrangement_notes;

pub use complete_occurrence::CompleteOccurrenceUseCase;
pub use hydrate_occurrences::{HydrateOccurrencesUseCase, HydrationReport};
pub use refresh_prompts::RefreshPromptsUseCase;
pub use send_due_prompts::SendDuePromptsUseCase;
pub use snooze_occurrence::SnoozeOccurrenceUseCase;
pub use update_arrangement_notes::UpdateArrangementNotesUseCase;
