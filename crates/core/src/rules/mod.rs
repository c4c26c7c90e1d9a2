mod add_reminder_rule;
mod list_reminder_rules;
mod remove_reminder_rule;

pub use add_reminder_rule::AddReminderRuleUseCase;
pub use list_reminder_rules::ListReminderRulesUseCase;
pub use remove_reminder_rule::RemoveReminderRuleUseCase;
