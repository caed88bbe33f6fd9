//! reqwest client for `GET /api/contacts`.

use std::time::Duration;

use async_trait::async_trait;
use mailreach_core::config::ContactsApiConfig;
use mailreach_core::{MailreachError, MailreachResult};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::source::{ContactPage, ContactSource};

/// Response envelope shared by the backend's JSON endpoints.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

pub struct HttpContactSource {
    client: Client,
    endpoint: Url,
    api_token: Option<String>,
}

impl HttpContactSource {
    pub fn new(config: &ContactsApiConfig) -> MailreachResult<Self> {
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let endpoint = Url::parse(&base)
            .and_then(|b| b.join("api/contacts"))
            .map_err(|e| MailreachError::Config(format!("invalid contacts_api.base_url: {e}")))?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| MailreachError::Http(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            api_token: config.api_token.clone().filter(|t| !t.is_empty()),
        })
    }

    pub fn contacts_url(&self, page: u32, limit: u32, search: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("limit", &limit.to_string())
            .append_pair("search", search);
        url
    }
}

#[async_trait]
impl ContactSource for HttpContactSource {
    async fn fetch_page(&self, page: u32, limit: u32, search: &str) -> MailreachResult<ContactPage> {
        let url = self.contacts_url(page, limit, search);
        debug!(url = %url, "Requesting contacts page");

        let mut request = self.client.get(url);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| MailreachError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            metrics::counter!("contacts_api.errors").increment(1);
            return Err(MailreachError::ContactsApi {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: ApiEnvelope<ContactPage> = response
            .json()
            .await
            .map_err(|e| MailreachError::Http(e.to_string()))?;

        parse_envelope(status.as_u16(), envelope)
    }
}

fn parse_envelope(status: u16, envelope: ApiEnvelope<ContactPage>) -> MailreachResult<ContactPage> {
    if !envelope.success {
        metrics::counter!("contacts_api.errors").increment(1);
        return Err(MailreachError::ContactsApi {
            status,
            message: envelope
                .error
                .or(envelope.message)
                .unwrap_or_else(|| "request was not successful".to_string()),
        });
    }
    envelope.data.ok_or_else(|| MailreachError::ContactsApi {
        status,
        message: "response has no data".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> ContactsApiConfig {
        ContactsApiConfig {
            base_url: base_url.to_string(),
            ..ContactsApiConfig::default()
        }
    }

    #[test]
    fn test_contacts_url() {
        let source = HttpContactSource::new(&config("https://api.example.com")).unwrap();
        assert_eq!(
            source.contacts_url(1, 10000, "").as_str(),
            "https://api.example.com/api/contacts?page=1&limit=10000&search="
        );

        let nested = HttpContactSource::new(&config("https://example.com/backend")).unwrap();
        assert_eq!(
            nested.contacts_url(2, 50, "a b").as_str(),
            "https://example.com/backend/api/contacts?page=2&limit=50&search=a+b"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = HttpContactSource::new(&config("not a url"));
        assert!(matches!(result, Err(MailreachError::Config(_))));
    }

    #[test]
    fn test_envelope_handling() {
        let ok: ApiEnvelope<ContactPage> = serde_json::from_value(serde_json::json!({
            "success": true,
            "data": { "contacts": [{ "email": "a@example.com" }], "total": 1 }
        }))
        .unwrap();
        let page = parse_envelope(200, ok).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.contacts.len(), 1);

        let failed: ApiEnvelope<ContactPage> = serde_json::from_value(serde_json::json!({
            "success": false,
            "error": "Unauthorized"
        }))
        .unwrap();
        match parse_envelope(200, failed) {
            Err(MailreachError::ContactsApi { message, .. }) => assert_eq!(message, "Unauthorized"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
