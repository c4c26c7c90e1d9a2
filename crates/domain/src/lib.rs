pub mod date;
mod event;
mod feed;
mod occurrence;
mod prompt;
mod rule;
mod shared;

pub use event::{
    EventRecord, EventStatus, DESCRIPTION_MAX_LEN, LOCATION_MAX_LEN, SUMMARY_MAX_LEN,
};
pub use feed::{FeedItem, FeedItemWhen, FeedSubscription, SyncCursor, SyncToken};
pub use occurrence::{
    normalize_arrangement_notes, OccurrenceState, PromptHandle, ReminderOccurrence,
};
pub use prompt::RenderedPrompt;
pub use rule::{best_match, normalize_for_match, ReminderRule};
pub use shared::entity::{Entity, InvalidIDError, ID};
