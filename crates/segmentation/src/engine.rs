//! Core segmentation engine: evaluates the dynamic group catalog against
//! one roster snapshot.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use mailreach_cache::{RosterCache, RosterSnapshot};
use mailreach_core::types::{CacheStatus, Contact};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::{SegmentDefinition, SegmentId};
use crate::predicates::PredicateGroup;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupType {
    Dynamic,
}

/// A named, computed view over the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactGroup {
    pub id: SegmentId,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub group_type: GroupType,
    pub criteria: PredicateGroup,
    pub count: usize,
}

impl ContactGroup {
    fn from_definition(definition: &SegmentDefinition, count: usize) -> Self {
        Self {
            id: definition.id,
            name: definition.id.name().to_string(),
            description: definition.id.description().to_string(),
            group_type: GroupType::Dynamic,
            criteria: definition.criteria.clone(),
            count,
        }
    }
}

/// Why a pass returned the zero-count catalog instead of real counts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DegradedReason {
    #[error("contact roster unavailable: {0}")]
    RosterUnavailable(String),

    #[error("segment evaluation failed: {0}")]
    EvaluationFailed(String),
}

/// Result of one evaluation pass. `groups` always holds the full catalog.
#[derive(Debug, Clone)]
pub struct GroupsOutcome {
    pub groups: Vec<ContactGroup>,
    pub degraded: Option<DegradedReason>,
    pub evaluated_at: DateTime<Utc>,
}

/// Counts the members of one segment.
type MemberCounter = fn(&SegmentDefinition, &[Contact], DateTime<Utc>) -> usize;

fn count_members(definition: &SegmentDefinition, contacts: &[Contact], now: DateTime<Utc>) -> usize {
    definition.criteria.filter(contacts, now).len()
}

pub struct SegmentationEngine {
    cache: Arc<RosterCache>,
    definitions: Vec<SegmentDefinition>,
    count_members: MemberCounter,
    /// Counts of the last finished pass, replaced as a whole.
    last_counts: RwLock<HashMap<SegmentId, usize>>,
}

impl SegmentationEngine {
    pub fn new(cache: Arc<RosterCache>) -> Self {
        Self {
            cache,
            definitions: SegmentDefinition::catalog(),
            count_members,
            last_counts: RwLock::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_member_counter(cache: Arc<RosterCache>, count_members: MemberCounter) -> Self {
        Self {
            count_members,
            ..Self::new(cache)
        }
    }

    pub fn cache(&self) -> &Arc<RosterCache> {
        &self.cache
    }

    pub(crate) fn definition(&self, id: SegmentId) -> Option<&SegmentDefinition> {
        self.definitions.iter().find(|d| d.id == id)
    }

    pub(crate) fn last_count(&self, id: SegmentId) -> usize {
        self.last_counts.read().get(&id).copied().unwrap_or(0)
    }

    /// The full catalog with every count at zero.
    pub fn empty_groups(&self) -> Vec<ContactGroup> {
        self.definitions
            .iter()
            .map(|d| ContactGroup::from_definition(d, 0))
            .collect()
    }

    /// Evaluate every segment against one snapshot at a single instant.
    pub fn evaluate_snapshot(
        &self,
        snapshot: &RosterSnapshot,
        now: DateTime<Utc>,
    ) -> Result<Vec<ContactGroup>, DegradedReason> {
        if let Some(err) = &snapshot.fetch_error {
            return Err(DegradedReason::RosterUnavailable(err.clone()));
        }
        let contacts: &[Contact] = &snapshot.contacts;

        panic::catch_unwind(AssertUnwindSafe(|| {
            self.definitions
                .iter()
                .map(|d| ContactGroup::from_definition(d, (self.count_members)(d, contacts, now)))
                .collect()
        }))
        .map_err(|payload| DegradedReason::EvaluationFailed(panic_message(payload.as_ref())))
    }

    /// Fetch (or reuse) the roster and evaluate the catalog, recording
    /// counts for [`Self::get_total_recipients_for_groups`].
    pub async fn evaluate_groups(&self) -> GroupsOutcome {
        let snapshot = self.cache.fetch_contacts().await;
        let now = self.cache.clock().now();

        let (groups, degraded) = match self.evaluate_snapshot(&snapshot, now) {
            Ok(groups) => (groups, None),
            Err(reason) => {
                warn!(reason = %reason, "Serving zero-count contact groups");
                metrics::counter!("segmentation.groups.degraded").increment(1);
                (self.empty_groups(), Some(reason))
            }
        };

        let counts: HashMap<_, _> = groups.iter().map(|g| (g.id, g.count)).collect();
        *self.last_counts.write() = counts;
        debug!(
            roster = snapshot.contacts.len(),
            degraded = degraded.is_some(),
            "Evaluated contact groups"
        );

        GroupsOutcome {
            groups,
            degraded,
            evaluated_at: now,
        }
    }

    /// Every catalog group with a live count. Never fails.
    pub async fn get_dynamic_contact_groups(&self) -> Vec<ContactGroup> {
        self.evaluate_groups().await.groups
    }

    pub fn refresh_cache(&self) {
        self.cache.refresh_cache();
    }

    pub fn get_cache_status(&self) -> CacheStatus {
        self.cache.get_cache_status()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
