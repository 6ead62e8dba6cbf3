//! HTTP access to the email processing backend

use std::future::Future;
use std::time::Duration;

use reqwest::Client;

use super::error::SyncError;
use super::types::{Email, RefreshStatus, assign_missing_ids};

pub const REFRESH_PATH: &str = "/refresh-emails";
pub const STATUS_PATH: &str = "/refresh-status";
pub const PROCESSED_PATH: &str = "/processed-emails";

/// Raw request/response access to the backend.
///
/// Bodies are returned undecoded so that decoding stays in one place and
/// can be exercised against canned payloads.
pub trait Transport: Send + Sync + 'static {
    fn post(&self, path: &str) -> impl Future<Output = Result<String, SyncError>> + Send;
    fn get(&self, path: &str) -> impl Future<Output = Result<String, SyncError>> + Send;
}

/// `reqwest`-backed transport bound to one base URL
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SyncError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("mailcards/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_body(response: reqwest::Response) -> Result<String, SyncError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.text().await?)
    }
}

impl Transport for HttpTransport {
    async fn post(&self, path: &str) -> Result<String, SyncError> {
        tracing::debug!("POST {}", path);
        let response = self.client.post(self.url(path)).send().await?;
        Self::read_body(response).await
    }

    async fn get(&self, path: &str) -> Result<String, SyncError> {
        tracing::debug!("GET {}", path);
        let response = self.client.get(self.url(path)).send().await?;
        Self::read_body(response).await
    }
}

pub fn decode_status(body: &str) -> Result<RefreshStatus, SyncError> {
    Ok(serde_json::from_str(body)?)
}

pub fn decode_emails(body: &str) -> Result<Vec<Email>, SyncError> {
    let mut emails: Vec<Email> = serde_json::from_str(body)?;
    assign_missing_ids(&mut emails);
    Ok(emails)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::types::BatchStatus;

    #[test]
    fn test_url_joins_without_double_slash() {
        let transport =
            HttpTransport::new("http://localhost:8000/", Duration::from_secs(5)).unwrap();
        assert_eq!(
            transport.url(STATUS_PATH),
            "http://localhost:8000/refresh-status"
        );
    }

    #[test]
    fn test_decode_status() {
        let status =
            decode_status(r#"{"status": "processing", "message": "3 of 9", "count": 0}"#)
                .unwrap();
        assert_eq!(status.status, BatchStatus::Processing);
        assert_eq!(status.message, "3 of 9");
    }

    #[test]
    fn test_decode_rejects_malformed_bodies() {
        assert!(decode_status("<html>502 Bad Gateway</html>").unwrap_err().is_decode());
        assert!(decode_status(r#"{"message": "no status"}"#).unwrap_err().is_decode());
        assert!(decode_emails(r#"{"emails": []}"#).unwrap_err().is_decode());
        assert!(decode_emails("").unwrap_err().is_decode());
    }

    #[test]
    fn test_decode_emails_assigns_ids() {
        let emails = decode_emails(r#"[{"subject": "a"}, {"subject": "b"}]"#).unwrap();
        assert_eq!(emails[0].id(), "#0");
        assert_eq!(emails[1].id(), "#1");
    }

    #[test]
    fn test_decode_mixed_ids_stay_distinct() {
        let emails =
            decode_emails(r#"[{"id": "1", "subject": "Real one"}, {"subject": "Second, no id"}]"#)
                .unwrap();
        assert_eq!(emails[0].id(), "1");
        assert_ne!(emails[1].id(), emails[0].id());
        let second = emails.iter().find(|e| e.id() == emails[1].id()).unwrap();
        assert_eq!(second.subject, "Second, no id");
    }
}
