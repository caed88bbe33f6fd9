//! The fixed catalog of dynamic contact groups offered to campaign targeting.

use mailreach_core::types::{Counter, DateField};
use serde::{Deserialize, Serialize};

use crate::builder::SegmentBuilder;
use crate::predicates::PredicateGroup;

pub const VIP_TAGS: [&str; 4] = ["VIP", "Premium", "Enterprise", "High-Value"];

pub const ACTIVE_OPEN_WINDOW_DAYS: u32 = 90;
pub const NEW_CONTACT_WINDOW_DAYS: u32 = 30;
pub const ENGAGED_OPEN_WINDOW_DAYS: u32 = 60;
pub const INACTIVE_AFTER_DAYS: u32 = 90;

pub const VIP_SCORE_THRESHOLD: f64 = 0.8;
pub const ENGAGED_SCORE_THRESHOLD: f64 = 0.3;
pub const ENGAGED_MIN_OPENS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentId {
    All,
    Active,
    New,
    Vip,
    Engaged,
    Inactive,
}

impl SegmentId {
    /// Every segment, in display order.
    pub const CATALOG: [SegmentId; 6] = [
        SegmentId::All,
        SegmentId::Active,
        SegmentId::New,
        SegmentId::Vip,
        SegmentId::Engaged,
        SegmentId::Inactive,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            SegmentId::All => "all",
            SegmentId::Active => "active",
            SegmentId::New => "new",
            SegmentId::Vip => "vip",
            SegmentId::Engaged => "engaged",
            SegmentId::Inactive => "inactive",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::CATALOG.into_iter().find(|id| id.slug() == slug)
    }

    pub fn name(self) -> &'static str {
        match self {
            SegmentId::All => "All Contacts",
            SegmentId::Active => "Active Subscribers",
            SegmentId::New => "New Subscribers",
            SegmentId::Vip => "VIP Customers",
            SegmentId::Engaged => "Highly Engaged",
            SegmentId::Inactive => "Re-engagement",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SegmentId::All => "Every active contact in your list",
            SegmentId::Active => "Contacts who opened an email in the last 90 days",
            SegmentId::New => "Contacts added in the last 30 days",
            SegmentId::Vip => "Contacts tagged VIP, Premium, Enterprise or High-Value, plus top scorers",
            SegmentId::Engaged => "Frequent openers with recent activity in the last 60 days",
            SegmentId::Inactive => "Contacts with no opens or sends in the last 90 days",
        }
    }

    pub fn criteria(self) -> PredicateGroup {
        let base = SegmentBuilder::new().active();
        match self {
            SegmentId::All => base,
            SegmentId::Active => {
                base.within_days(DateField::LastOpenedAt, ACTIVE_OPEN_WINDOW_DAYS)
            }
            SegmentId::New => base.within_days(DateField::CreatedAt, NEW_CONTACT_WINDOW_DAYS),
            SegmentId::Vip => {
                base.any_of(|b| b.has_any_tag(VIP_TAGS).score_above(VIP_SCORE_THRESHOLD))
            }
            SegmentId::Engaged => base
                .score_above(ENGAGED_SCORE_THRESHOLD)
                .within_days(DateField::LastOpenedAt, ENGAGED_OPEN_WINDOW_DAYS)
                .count_at_least(Counter::Opens, ENGAGED_MIN_OPENS),
            // A contact younger than the window cannot have gone quiet for it.
            SegmentId::Inactive => base
                .older_than(DateField::LastOpenedAt, INACTIVE_AFTER_DAYS)
                .older_than(DateField::LastContactedAt, INACTIVE_AFTER_DAYS)
                .older_than(DateField::CreatedAt, INACTIVE_AFTER_DAYS),
        }
        .build()
    }
}

impl std::fmt::Display for SegmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// A catalog entry with its compiled criteria.
#[derive(Debug, Clone)]
pub struct SegmentDefinition {
    pub id: SegmentId,
    pub criteria: PredicateGroup,
}

impl SegmentDefinition {
    pub fn catalog() -> Vec<SegmentDefinition> {
        SegmentId::CATALOG
            .into_iter()
            .map(|id| SegmentDefinition {
                id,
                criteria: id.criteria(),
            })
            .collect()
    }
}
