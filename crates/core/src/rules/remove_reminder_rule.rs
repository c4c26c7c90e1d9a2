use tickler_domain::{ReminderRule, ID};
use tickler_infra::TicklerContext;
use tracing::info;

use crate::shared::usecase::UseCase;

/// Deletes a rule together with every occurrence it spawned, completed
/// ones included.
#[derive(Debug)]
pub struct RemoveReminderRuleUseCase {
    pub rule_id: ID,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound,
}

#[async_trait::async_trait]
impl UseCase for RemoveReminderRuleUseCase {
    type Response = ReminderRule;
    type Error = UseCaseError;

    const NAME: &'static str = "RemoveReminderRule";

    async fn execute(&mut self, ctx: &TicklerContext) -> Result<Self::Response, Self::Error> {
        let rule = ctx
            .repos
            .reminder_rules
            .delete(&self.rule_id)
            .await
            .ok_or(UseCaseError::NotFound)?;

        let deleted = ctx
            .repos
            .reminder_occurrences
            .delete_by_rule(&self.rule_id)
            .await;
        info!(
            "Rule: {} removed together with {} occurrences",
            self.rule_id, deleted.deleted_count
        );

        Ok(rule)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::rules::AddReminderRuleUseCase;
    use chrono::{Duration, Utc};
    use tickler_domain::ReminderOccurrence;

    #[tokio::test]
    async fn removes_rule_and_its_occurrences() {
        let ctx = TicklerContext::create_inmemory();
        let rule = AddReminderRuleUseCase {
            keyword: "dentist".into(),
            reminder_days: 7,
            notify_targets: vec![],
            arrangements_required: false,
            created_by: "admin".into(),
        }
        .execute(&ctx)
        .await
        .unwrap();

        let now = Utc::now();
        let occurrence = ReminderOccurrence {
            id: ID::default(),
            rule_id: rule.id.clone(),
            feed_id: "feed-1".into(),
            item_id: "ev-1".into(),
            occurrence_start: now + Duration::days(3),
            occurrence_end: None,
            summary: "Dentist".into(),
            reminder_at: now,
            is_all_day: false,
            arrangements_required: false,
            arrangements_notes: None,
            completed_at: None,
            last_prompt_at: None,
            snoozed_until: None,
            prompt_handle: None,
        };
        ctx.repos
            .reminder_occurrences
            .insert(&occurrence)
            .await
            .unwrap();

        let mut usecase = RemoveReminderRuleUseCase {
            rule_id: rule.id.clone(),
        };
        usecase.execute(&ctx).await.unwrap();

        assert!(ctx.repos.reminder_rules.find(&rule.id).await.is_none());
        assert!(ctx
            .repos
            .reminder_occurrences
            .find(&occurrence.id)
            .await
            .is_none());

        let res = usecase.execute(&ctx).await;
        assert!(matches!(res, Err(UseCaseError::NotFound)));
    }
}
