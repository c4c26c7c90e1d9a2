mod feed_provider;
mod google_calendar;
mod prompt_sink;

pub use feed_provider::{
    FeedPage, FeedPageQuery, FeedProviderError, IAccessTokenProvider, IFeedProvider,
};
pub use google_calendar::{GoogleAuthProvider, GoogleCalendarFeedProvider};
pub use prompt_sink::{IPromptSink, WebhookPromptSink};
