use tickler_domain::{ReminderRule, ID};
use tickler_infra::TicklerContext;

use crate::shared::usecase::UseCase;

#[derive(Debug)]
pub struct AddReminderRuleUseCase {
    pub keyword: String,
    pub reminder_days: i64,
    pub notify_targets: Vec<String>,
    pub arrangements_required: bool,
    pub created_by: String,
}

#[derive(Debug)]
pub enum UseCaseError {
    EmptyKeyword,
    InvalidReminderDays,
    StorageError,
}

#[async_trait::async_trait]
impl UseCase for AddReminderRuleUseCase {
    type Response = ReminderRule;
    type Error = UseCaseError;

    const NAME: &'static str = "AddReminderRule";

    async fn execute(&mut self, ctx: &TicklerContext) -> Result<Self::Response, Self::Error> {
        let keyword = ReminderRule::normalize_keyword(&self.keyword);
        if keyword.is_empty() {
            return Err(UseCaseError::EmptyKeyword);
        }
        if self.reminder_days < 0 {
            return Err(UseCaseError::InvalidReminderDays);
        }

        let mut notify_targets = Vec::new();
        for target in &self.notify_targets {
            let target = target.trim();
            if !target.is_empty() && !notify_targets.iter().any(|t| t == target) {
                notify_targets.push(target.to_string());
            }
        }

        let rule = ReminderRule {
            id: ID::default(),
            keyword,
            reminder_days: self.reminder_days,
            notify_targets,
            arrangements_required: self.arrangements_required,
            created_by: self.created_by.clone(),
            created_at: ctx.sys.now(),
        };
        ctx.repos
            .reminder_rules
            .insert(&rule)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(rule)
    }
}
