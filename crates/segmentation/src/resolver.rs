//! Recipient resolution: turns chosen group ids into send targets.

use std::collections::BTreeSet;

use mailreach_core::types::Contact;
use tracing::debug;

use crate::catalog::SegmentId;
use crate::engine::SegmentationEngine;

impl SegmentationEngine {
    /// Members of one group against the current roster. Unknown ids yield
    /// an empty list.
    pub async fn get_contacts_for_group(&self, group_id: &str) -> Vec<Contact> {
        let Some(definition) = SegmentId::from_slug(group_id).and_then(|id| self.definition(id))
        else {
            debug!(group_id = group_id, "Unknown contact group");
            return Vec::new();
        };

        let snapshot = self.cache().fetch_contacts().await;
        let now = self.cache().clock().now();
        definition
            .criteria
            .filter(&snapshot.contacts, now)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Distinct email addresses across all listed groups. Order carries no
    /// meaning.
    pub async fn get_contact_emails_for_groups<S: AsRef<str>>(&self, group_ids: &[S]) -> Vec<String> {
        let definitions: Vec<_> = group_ids
            .iter()
            .filter_map(|id| SegmentId::from_slug(id.as_ref()))
            .filter_map(|id| self.definition(id))
            .collect();
        if definitions.is_empty() {
            return Vec::new();
        }

        let snapshot = self.cache().fetch_contacts().await;
        let now = self.cache().clock().now();

        let emails: BTreeSet<&str> = definitions
            .iter()
            .flat_map(|d| d.criteria.filter(&snapshot.contacts, now))
            .map(|c| c.email.as_str())
            .collect();
        emails.into_iter().map(str::to_string).collect()
    }

    /// Sum of the last evaluated counts of the selected groups.
    ///
    /// Each listed id adds its count, so a contact in two selected groups is
    /// counted twice. This is a quick display estimate; the send list comes
    /// from [`Self::get_contact_emails_for_groups`]. Unknown ids and groups
    /// never evaluated count as zero.
    pub fn get_total_recipients_for_groups<S: AsRef<str>>(&self, group_ids: &[S]) -> usize {
        group_ids
            .iter()
            .filter_map(|id| SegmentId::from_slug(id.as_ref()))
            .map(|id| self.last_count(id))
            .sum()
    }
}
