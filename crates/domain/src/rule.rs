use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::entity::{Entity, ID};

/// A keyword-driven reminder definition. Events whose summary contains
/// the keyword spawn one `ReminderOccurrence` per spanned calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderRule {
    pub id: ID,
    pub keyword: String,
    /// Whole days before the occurrence start at which to remind.
    pub reminder_days: i64,
    /// Opaque ids of parties to mention in the prompt.
    pub notify_targets: Vec<String>,
    pub arrangements_required: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Entity for ReminderRule {
    fn id(&self) -> &ID {
        &self.id
    }
}

impl ReminderRule {
    /// Canonical stored form of a keyword.
    pub fn normalize_keyword(value: &str) -> String {
        value.trim().to_lowercase()
    }
}

/// Lowercases and collapses every non-alphanumeric run to a single space,
/// so that "Dentist: check-up!" and "dentist check up" compare equal.
pub fn normalize_for_match(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_space = false;
    for c in value.chars() {
        if c.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(c.to_lowercase());
        } else {
            pending_space = true;
        }
    }
    out
}

/// Resolves the single best-matching rule for an event summary. A rule
/// matches when its normalized keyword occurs in the normalized summary;
/// the longest keyword wins, equal lengths fall back to rule id ordering.
pub fn best_match<'a>(summary: &str, rules: &'a [ReminderRule]) -> Option<&'a ReminderRule> {
    let normalized_summary = normalize_for_match(summary);
    if normalized_summary.is_empty() {
        return None;
    }

    rules
        .iter()
        .filter(|rule| {
            let keyword = normalize_for_match(&rule.keyword);
            !keyword.is_empty() && normalized_summary.contains(&keyword)
        })
        .max_by(|a, b| {
            a.keyword
                .len()
                .cmp(&b.keyword.len())
                .then_with(|| b.id.cmp(&a.id))
        })
}

#[cfg(test)]
mod test {
    use super::*;

    fn rule(keyword: &str) -> ReminderRule {
        ReminderRule {
            id: Default::default(),
            keyword: keyword.into(),
            reminder_days: 2,
            notify_targets: Vec::new(),
            arrangements_required: false,
            created_by: "admin".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn normalization_collapses_punctuation_runs() {
        assert_eq!(normalize_for_match("  Dentist:  check-up! "), "dentist check up");
        assert_eq!(normalize_for_match("!!!"), "");
    }

    #[test]
    fn matches_keyword_as_substring() {
        let rules = vec![rule("dentist")];
        assert!(best_match("Dentist appointment", &rules).is_some());
        assert!(best_match("Team standup", &rules).is_none());
    }

    #[test]
    fn longest_keyword_wins() {
        let rules = vec![rule("dentist"), rule("dentist appointment")];
        let matched = best_match("Annual dentist appointment", &rules).unwrap();
        assert_eq!(matched.keyword, "dentist appointment");
    }

    #[test]
    fn equal_length_keywords_break_ties_deterministically() {
        let rules = vec![rule("aaa bbb"), rule("bbb ccc")];
        let first = best_match("aaa bbb ccc", &rules).unwrap().id.clone();
        let second = best_match("aaa bbb ccc", &rules).unwrap().id.clone();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_summary_matches_nothing() {
        let rules = vec![rule("dentist")];
        assert!(best_match("", &rules).is_none());
        assert!(best_match("   ", &rules).is_none());
    }
}
