//! Raw backend records and their normalization into [`Contact`].

use chrono::{DateTime, NaiveDateTime, Utc};
use mailreach_core::types::{Contact, ContactStatus};
use mailreach_core::{MailreachError, MailreachResult};
use serde::{Deserialize, Serialize};

/// A contact exactly as the backend sends it: every field may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContact {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub status: Option<ContactStatus>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_contacted_at: Option<String>,
    #[serde(default)]
    pub last_opened_at: Option<String>,
    #[serde(default)]
    pub last_clicked_at: Option<String>,
    #[serde(default)]
    pub open_count: Option<i64>,
    #[serde(default)]
    pub click_count: Option<i64>,
    #[serde(default)]
    pub bounce_count: Option<i64>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl From<&Contact> for RawContact {
    fn from(contact: &Contact) -> Self {
        let ts = |t: Option<DateTime<Utc>>| t.map(|t| t.to_rfc3339());
        Self {
            id: Some(serde_json::Value::String(contact.id.clone())),
            email: Some(contact.email.clone()),
            first_name: contact.first_name.clone(),
            last_name: contact.last_name.clone(),
            company: contact.company.clone(),
            status: Some(contact.status),
            created_at: Some(contact.created_at.to_rfc3339()),
            last_contacted_at: ts(contact.last_contacted_at),
            last_opened_at: ts(contact.last_opened_at),
            last_clicked_at: ts(contact.last_clicked_at),
            open_count: Some(contact.open_count as i64),
            click_count: Some(contact.click_count as i64),
            bounce_count: Some(contact.bounce_count as i64),
            tags: Some(contact.tags.clone()),
        }
    }
}

/// Normalize a backend record.
///
/// Missing status becomes `ACTIVE`, missing or negative counters become 0,
/// missing tags become empty and unparseable optional timestamps are
/// treated as absent. A record without an email or a usable `createdAt`
/// is rejected.
pub fn normalize(raw: RawContact) -> MailreachResult<Contact> {
    let email = raw
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| MailreachError::InvalidRecord("missing email".to_string()))?;

    let created_at = raw
        .created_at
        .as_deref()
        .and_then(parse_timestamp)
        .ok_or_else(|| MailreachError::InvalidRecord(format!("{email}: missing or invalid createdAt")))?;

    let id = match raw.id {
        Some(serde_json::Value::String(s)) if !s.is_empty() => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => email.clone(),
    };

    let counter = |c: Option<i64>| c.unwrap_or(0).max(0) as u64;

    Ok(Contact {
        id,
        email,
        first_name: raw.first_name,
        last_name: raw.last_name,
        company: raw.company,
        status: raw.status.unwrap_or_default(),
        created_at,
        last_contacted_at: raw.last_contacted_at.as_deref().and_then(parse_timestamp),
        last_opened_at: raw.last_opened_at.as_deref().and_then(parse_timestamp),
        last_clicked_at: raw.last_clicked_at.as_deref().and_then(parse_timestamp),
        open_count: counter(raw.open_count),
        click_count: counter(raw.click_count),
        bounce_count: counter(raw.bounce_count),
        tags: raw.tags.unwrap_or_default(),
    })
}

/// RFC 3339 first, then a zone-less ISO-8601 form read as UTC.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
