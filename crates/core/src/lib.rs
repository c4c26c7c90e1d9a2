pub mod feed;
pub mod job_schedulers;
pub mod reminders;
pub mod rules;
pub mod shared;
pub mod sync;
