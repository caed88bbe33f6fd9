//! Dynamic contact segmentation: engagement scoring, declarative segment
//! predicates, the fixed group catalog, and recipient resolution for
//! campaign targeting.

#![warn(clippy::unwrap_used)]

pub mod builder;
pub mod catalog;
pub mod engine;
pub mod predicates;
pub mod resolver;
pub mod scoring;

pub use builder::SegmentBuilder;
pub use catalog::{SegmentDefinition, SegmentId};
pub use engine::{ContactGroup, DegradedReason, GroupType, GroupsOutcome, SegmentationEngine};
pub use predicates::{LogicalOperator, Predicate, PredicateGroup};
pub use scoring::engagement_score;
