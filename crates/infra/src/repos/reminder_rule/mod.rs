mod inmemory;
mod postgres;

pub use inmemory::InMemoryReminderRuleRepo;
pub use postgres::PostgresReminderRuleRepo;
use tickler_domain::{ReminderRule, ID};

#[async_trait::async_trait]
pub trait IReminderRuleRepo: Send + Sync {
    async fn insert(&self, rule: &ReminderRule) -> anyhow::Result<()>;
    async fn find(&self, rule_id: &ID) -> Option<ReminderRule>;
    async fn find_all(&self) -> Vec<ReminderRule>;
    async fn delete(&self, rule_id: &ID) -> Option<ReminderRule>;
}
