//! Segment builder: fluent API for constructing segment criteria.

use mailreach_core::types::{ContactStatus, Counter, DateField};

use crate::predicates::{LogicalOperator, Predicate, PredicateGroup};

#[derive(Debug, Clone)]
pub struct SegmentBuilder {
    predicates: Vec<Predicate>,
    groups: Vec<PredicateGroup>,
    operator: LogicalOperator,
}

impl SegmentBuilder {
    pub fn new() -> Self {
        Self {
            predicates: Vec::new(),
            groups: Vec::new(),
            operator: LogicalOperator::And,
        }
    }

    pub fn with_or(mut self) -> Self {
        self.operator = LogicalOperator::Or;
        self
    }

    pub fn status(mut self, status: ContactStatus) -> Self {
        self.predicates.push(Predicate::Status { status });
        self
    }

    pub fn active(self) -> Self {
        self.status(ContactStatus::Active)
    }

    pub fn within_days(mut self, field: DateField, days: u32) -> Self {
        self.predicates.push(Predicate::WithinDays { field, days });
        self
    }

    pub fn older_than(mut self, field: DateField, days: u32) -> Self {
        self.predicates.push(Predicate::OlderThan { field, days });
        self
    }

    pub fn has_any_tag<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.predicates.push(Predicate::HasAnyTag {
            tags: tags.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn score_above(mut self, threshold: f64) -> Self {
        self.predicates.push(Predicate::ScoreAbove { threshold });
        self
    }

    pub fn count_at_least(mut self, counter: Counter, min: u64) -> Self {
        self.predicates.push(Predicate::CountAtLeast { counter, min });
        self
    }

    /// Nest a sub-group whose rules are OR-ed together.
    pub fn any_of(mut self, build: impl FnOnce(SegmentBuilder) -> SegmentBuilder) -> Self {
        self.groups.push(build(SegmentBuilder::new().with_or()).build());
        self
    }

    pub fn build(self) -> PredicateGroup {
        PredicateGroup {
            operator: self.operator,
            predicates: self.predicates,
            groups: self.groups,
        }
    }
}

impl Default for SegmentBuilder {
    fn default() -> Self {
        Self::new()
    }
}
