use std::path::Path;

use async_trait::async_trait;
use mailreach_core::types::Contact;
use mailreach_core::MailreachResult;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::normalize::RawContact;

/// One page of the Contacts API listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactPage {
    #[serde(default)]
    pub contacts: Vec<RawContact>,
    #[serde(default)]
    pub total: u64,
}

/// Anything that can serve the paged contact listing.
#[async_trait]
pub trait ContactSource: Send + Sync {
    /// `page` is 1-based.
    async fn fetch_page(&self, page: u32, limit: u32, search: &str) -> MailreachResult<ContactPage>;
}

/// A roster held in memory, served with the same paging semantics as the
/// backend. `search` is matched case-insensitively against email and names.
#[derive(Debug, Clone, Default)]
pub struct StaticContactSource {
    records: Vec<RawContact>,
}

impl StaticContactSource {
    pub fn new(records: Vec<RawContact>) -> Self {
        Self { records }
    }

    pub fn from_contacts(contacts: &[Contact]) -> Self {
        Self::new(contacts.iter().map(RawContact::from).collect())
    }

    /// Load a JSON array of raw contact records.
    pub fn from_json_file(path: impl AsRef<Path>) -> MailreachResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let records: Vec<RawContact> = serde_json::from_str(&data)?;
        info!(path = %path.display(), records = records.len(), "Loaded roster file");
        Ok(Self::new(records))
    }

    fn matches(record: &RawContact, needle: &str) -> bool {
        [&record.email, &record.first_name, &record.last_name]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

#[async_trait]
impl ContactSource for StaticContactSource {
    async fn fetch_page(&self, page: u32, limit: u32, search: &str) -> MailreachResult<ContactPage> {
        let needle = search.trim().to_lowercase();
        let filtered: Vec<&RawContact> = self
            .records
            .iter()
            .filter(|r| needle.is_empty() || Self::matches(r, &needle))
            .collect();

        let start = (page.max(1) as usize - 1).saturating_mul(limit as usize);
        let contacts = filtered
            .iter()
            .skip(start)
            .take(limit as usize)
            .map(|r| (*r).clone())
            .collect();

        Ok(ContactPage {
            contacts,
            total: filtered.len() as u64,
        })
    }
}
