use super::IReminderRuleRepo;
use crate::repos::shared::inmemory_repo::*;
use std::sync::Mutex;
use tickler_domain::{ReminderRule, ID};

pub struct InMemoryReminderRuleRepo {
    rules: Mutex<Vec<ReminderRule>>,
}

impl InMemoryReminderRuleRepo {
    pub fn new() -> Self {
        Self {
            rules: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IReminderRuleRepo for InMemoryReminderRuleRepo {
    async fn insert(&self, rule: &ReminderRule) -> anyhow::Result<()> {
        insert(rule, &self.rules);
        Ok(())
    }

    async fn find(&self, rule_id: &ID) -> Option<ReminderRule> {
        find(rule_id, &self.rules)
    }

    async fn find_all(&self) -> Vec<ReminderRule> {
        find_by(&self.rules, |_| true)
    }

    async fn delete(&self, rule_id: &ID) -> Option<ReminderRule> {
        delete(rule_id, &self.rules)
    }
}
