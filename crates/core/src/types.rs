use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a contact as reported by the backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContactStatus {
    #[default]
    Active,
    Bounced,
    Unsubscribed,
    /// Also absorbs status strings this build does not know about, so they
    /// are never treated as sendable.
    #[serde(other)]
    Pending,
}

/// One email recipient, normalized from the Contacts API snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default)]
    pub status: ContactStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_contacted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_opened_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_clicked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub open_count: u64,
    #[serde(default)]
    pub click_count: u64,
    #[serde(default)]
    pub bounce_count: u64,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Contact {
    /// An active contact with no activity history.
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            first_name: None,
            last_name: None,
            company: None,
            status: ContactStatus::Active,
            created_at,
            last_contacted_at: None,
            last_opened_at: None,
            last_clicked_at: None,
            open_count: 0,
            click_count: 0,
            bounce_count: 0,
            tags: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ContactStatus::Active
    }

    pub fn date(&self, field: DateField) -> Option<DateTime<Utc>> {
        match field {
            DateField::CreatedAt => Some(self.created_at),
            DateField::LastContactedAt => self.last_contacted_at,
            DateField::LastOpenedAt => self.last_opened_at,
            DateField::LastClickedAt => self.last_clicked_at,
        }
    }

    pub fn counter(&self, counter: Counter) -> u64 {
        match counter {
            Counter::Opens => self.open_count,
            Counter::Clicks => self.click_count,
            Counter::Bounces => self.bounce_count,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Temporal fields a segment rule can window on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DateField {
    CreatedAt,
    LastContactedAt,
    LastOpenedAt,
    LastClickedAt,
}

/// Engagement counters a segment rule can threshold on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Counter {
    Opens,
    Clicks,
    Bounces,
}

/// Read-only view of the roster cache.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub loaded: bool,
    /// Epoch milliseconds of the last completed fetch, 0 when unset.
    pub last_fetch: i64,
    pub count: usize,
}

impl CacheStatus {
    pub fn empty() -> Self {
        Self {
            loaded: false,
            last_fetch: 0,
            count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_contact_deserializes_backend_shape() {
        let json = serde_json::json!({
            "id": "c-1",
            "email": "alice@example.com",
            "firstName": "Alice",
            "status": "UNSUBSCRIBED",
            "createdAt": "2024-01-05T10:00:00Z",
            "lastOpenedAt": "2024-02-01T08:30:00Z",
            "openCount": 7,
            "tags": ["VIP"]
        });

        let contact: Contact = serde_json::from_value(json).unwrap();
        assert_eq!(contact.status, ContactStatus::Unsubscribed);
        assert_eq!(contact.first_name.as_deref(), Some("Alice"));
        assert_eq!(contact.open_count, 7);
        assert_eq!(contact.click_count, 0);
        assert!(contact.has_tag("VIP"));
        assert!(!contact.has_tag("vip"));
        assert_eq!(
            contact.date(DateField::LastOpenedAt),
            Some(Utc.with_ymd_and_hms(2024, 2, 1, 8, 30, 0).unwrap())
        );
        assert_eq!(contact.date(DateField::LastClickedAt), None);
    }

    #[test]
    fn test_unknown_status_is_not_active() {
        let status: ContactStatus = serde_json::from_str("\"ARCHIVED\"").unwrap();
        assert_eq!(status, ContactStatus::Pending);
    }

    #[test]
    fn test_cache_status_wire_names() {
        let json = serde_json::to_value(CacheStatus::empty()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"loaded": false, "lastFetch": 0, "count": 0})
        );
    }
}
