//! Full-roster assembly on top of the paged listing.

use std::collections::HashSet;

use mailreach_core::types::Contact;
use mailreach_core::MailreachResult;
use tracing::{debug, info, warn};

use crate::normalize::normalize;
use crate::source::ContactSource;

/// Fetch every contact the source reports, page by page.
///
/// Keeps paging until the reported `total` has been received, an empty page
/// arrives, or `max_pages` pages were read. A short page ends the roster only
/// when the source reports no total. Stopping below the total is logged as a
/// truncated roster. Records that fail normalization are skipped and repeated
/// ids are kept once.
pub async fn fetch_roster(
    source: &dyn ContactSource,
    page_size: u32,
    max_pages: u32,
) -> MailreachResult<Vec<Contact>> {
    let page_size = page_size.max(1);
    let max_pages = max_pages.max(1);

    let mut contacts = Vec::new();
    let mut seen_ids = HashSet::new();
    let mut received: u64 = 0;
    let mut dropped: u64 = 0;
    let mut total: u64 = 0;
    let mut page = 1;

    loop {
        let batch = source.fetch_page(page, page_size, "").await?;
        let batch_len = batch.contacts.len() as u64;
        received += batch_len;

        for raw in batch.contacts {
            match normalize(raw) {
                Ok(contact) => {
                    if seen_ids.insert(contact.id.clone()) {
                        contacts.push(contact);
                    } else {
                        debug!(id = %contact.id, "Skipping repeated contact");
                    }
                }
                Err(e) => {
                    dropped += 1;
                    warn!(error = %e, "Dropping contact record");
                }
            }
        }

        total = batch.total;
        // A backend may cap `limit` below the requested page size, so a
        // short page only ends the roster when no total is reported.
        let complete = if total > 0 {
            received >= total
        } else {
            batch_len < page_size as u64
        };
        if batch_len == 0 || complete || page >= max_pages {
            break;
        }
        page += 1;
    }

    if received < total {
        warn!(
            pages = page,
            received = received,
            total = total,
            "Roster truncated before reported total"
        );
    }
    if dropped > 0 {
        metrics::counter!("contacts.records_dropped").increment(dropped);
    }
    info!(
        contacts = contacts.len(),
        pages = page,
        dropped = dropped,
        "Fetched contact roster"
    );
    Ok(contacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::RawContact;
    use crate::source::{ContactPage, StaticContactSource};
    use async_trait::async_trait;
    use chrono::Utc;
    use mailreach_core::MailreachError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn contacts(n: usize) -> Vec<Contact> {
        (0..n)
            .map(|i| Contact::new(format!("c-{i}"), format!("user{i}@example.com"), Utc::now()))
            .collect()
    }

    struct CountingSource {
        inner: StaticContactSource,
        calls: AtomicU32,
    }

    #[async_trait]
    impl ContactSource for CountingSource {
        async fn fetch_page(&self, page: u32, limit: u32, search: &str) -> MailreachResult<ContactPage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch_page(page, limit, search).await
        }
    }

    #[tokio::test]
    async fn test_paginates_until_total() {
        let source = CountingSource {
            inner: StaticContactSource::from_contacts(&contacts(25)),
            calls: AtomicU32::new(0),
        };

        let roster = fetch_roster(&source, 10, 100).await.unwrap();
        assert_eq!(roster.len(), 25);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exact_multiple_stops_on_total() {
        let source = CountingSource {
            inner: StaticContactSource::from_contacts(&contacts(20)),
            calls: AtomicU32::new(0),
        };

        let roster = fetch_roster(&source, 10, 100).await.unwrap();
        assert_eq!(roster.len(), 20);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_page_limit_truncates() {
        let source = StaticContactSource::from_contacts(&contacts(30));
        let roster = fetch_roster(&source, 10, 2).await.unwrap();
        assert_eq!(roster.len(), 20);
    }

    #[tokio::test]
    async fn test_invalid_and_repeated_records_skipped() {
        let mut records: Vec<RawContact> = contacts(3).iter().map(RawContact::from).collect();
        records.push(records[0].clone());
        records.push(RawContact {
            email: Some("broken@example.com".to_string()),
            ..RawContact::default()
        });

        let source = StaticContactSource::new(records);
        let roster = fetch_roster(&source, 100, 10).await.unwrap();
        assert_eq!(roster.len(), 3);
    }

    /// Serves at most 100 records per page whatever limit is asked for.
    struct CappedSource {
        inner: StaticContactSource,
        calls: AtomicU32,
    }

    #[async_trait]
    impl ContactSource for CappedSource {
        async fn fetch_page(&self, page: u32, limit: u32, search: &str) -> MailreachResult<ContactPage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch_page(page, limit.min(100), search).await
        }
    }

    #[tokio::test]
    async fn test_capped_page_size_still_reaches_total() {
        let source = CappedSource {
            inner: StaticContactSource::from_contacts(&contacts(250)),
            calls: AtomicU32::new(0),
        };

        let roster = fetch_roster(&source, 10_000, 100).await.unwrap();
        assert_eq!(roster.len(), 250);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    /// Reports no total, so only a short page can end the roster.
    struct UncountedSource(StaticContactSource);

    #[async_trait]
    impl ContactSource for UncountedSource {
        async fn fetch_page(&self, page: u32, limit: u32, search: &str) -> MailreachResult<ContactPage> {
            let mut batch = self.0.fetch_page(page, limit, search).await?;
            batch.total = 0;
            Ok(batch)
        }
    }

    #[tokio::test]
    async fn test_short_page_ends_roster_without_total() {
        let source = UncountedSource(StaticContactSource::from_contacts(&contacts(25)));
        let roster = fetch_roster(&source, 10, 100).await.unwrap();
        assert_eq!(roster.len(), 25);
    }

    struct FailingSource;

    #[async_trait]
    impl ContactSource for FailingSource {
        async fn fetch_page(&self, _page: u32, _limit: u32, _search: &str) -> MailreachResult<ContactPage> {
            Err(MailreachError::Http("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_source_error_propagates() {
        let result = fetch_roster(&FailingSource, 10, 10).await;
        assert!(matches!(result, Err(MailreachError::Http(_))));
    }
}
