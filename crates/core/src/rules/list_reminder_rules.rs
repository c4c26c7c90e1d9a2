use tickler_domain::ReminderRule;
use tickler_infra::TicklerContext;

use crate::shared::usecase::UseCase;

#[derive(Debug)]
pub struct ListReminderRulesUseCase;

#[derive(Debug)]
pub enum UseCaseError {}

#[async_trait::async_trait]
impl UseCase for ListReminderRulesUseCase {
    type Response = Vec<ReminderRule>;
    type Error = UseCaseError;

    const NAME: &'static str = "ListReminderRules";

    async fn execute(&mut self, ctx: &TicklerContext) -> Result<Self::Response, Self::Error> {
        Ok(ctx.repos.reminder_rules.find_all().await)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::rules::AddReminderRuleUseCase;

    #[tokio::test]
    async fn lists_rules_in_creation_order() {
        let ctx = TicklerContext::create_inmemory();
        for keyword in ["dentist", "vaccination"] {
            AddReminderRuleUseCase {
                keyword: keyword.into(),
                reminder_days: 7,
                notify_targets: vec![],
                arrangements_required: false,
                created_by: "admin".into(),
            }
            .execute(&ctx)
            .await
            .unwrap();
        }

        let rules = ListReminderRulesUseCase.execute(&ctx).await.unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].keyword, "dentist");
        assert_eq!(rules[1].keyword, "vaccination");
    }
}
