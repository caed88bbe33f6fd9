//! Predicate types and evaluation logic for segment criteria.

use chrono::{DateTime, Duration, Utc};
use mailreach_core::types::{Contact, ContactStatus, Counter, DateField};
use serde::{Deserialize, Serialize};

use crate::scoring::engagement_score;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredicateGroup {
    pub operator: LogicalOperator,
    pub predicates: Vec<Predicate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<PredicateGroup>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalOperator {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    Status {
        status: ContactStatus,
    },
    /// Field present and no more than `days` old (inclusive).
    WithinDays {
        field: DateField,
        days: u32,
    },
    /// Field absent, or strictly more than `days` old.
    OlderThan {
        field: DateField,
        days: u32,
    },
    /// Exact, case-sensitive match against any listed tag.
    HasAnyTag {
        tags: Vec<String>,
    },
    /// Engagement score strictly above the threshold.
    ScoreAbove {
        threshold: f64,
    },
    CountAtLeast {
        counter: Counter,
        min: u64,
    },
}

impl Predicate {
    pub fn matches(&self, contact: &Contact, now: DateTime<Utc>) -> bool {
        match self {
            Predicate::Status { status } => contact.status == *status,
            Predicate::WithinDays { field, days } => contact
                .date(*field)
                .is_some_and(|t| now - t <= Duration::days(i64::from(*days))),
            Predicate::OlderThan { field, days } => contact
                .date(*field)
                .map_or(true, |t| now - t > Duration::days(i64::from(*days))),
            Predicate::HasAnyTag { tags } => tags.iter().any(|tag| contact.has_tag(tag)),
            Predicate::ScoreAbove { threshold } => engagement_score(contact, now) > *threshold,
            Predicate::CountAtLeast { counter, min } => contact.counter(*counter) >= *min,
        }
    }
}

impl PredicateGroup {
    /// An empty AND group matches everything; an empty OR group matches nothing.
    pub fn matches(&self, contact: &Contact, now: DateTime<Utc>) -> bool {
        match self.operator {
            LogicalOperator::And => {
                self.predicates.iter().all(|p| p.matches(contact, now))
                    && self.groups.iter().all(|g| g.matches(contact, now))
            }
            LogicalOperator::Or => {
                self.predicates.iter().any(|p| p.matches(contact, now))
                    || self.groups.iter().any(|g| g.matches(contact, now))
            }
        }
    }

    /// Members of `contacts` matching this group, in roster order.
    pub fn filter<'a>(&self, contacts: &'a [Contact], now: DateTime<Utc>) -> Vec<&'a Contact> {
        contacts.iter().filter(|c| self.matches(c, now)).collect()
    }
}
