//! HTTP sync endpoint client.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;

use super::{ApplyOutcome, SyncEndpoint};
use crate::error::{Error, Result};
use crate::models::QueueItem;
use crate::util::{compact_text, is_http_url, normalize_text_option};

const HTTP_TIMEOUT_SECS: u64 = 30;

/// Applies queue items with `POST {base}/v1/sync/{type}/{id}`.
///
/// The server performs the optimistic-concurrency check and answers
/// `409 Conflict` with its current version of the record.
#[derive(Clone)]
pub struct HttpSyncEndpoint {
    base_url: String,
    auth_token: Option<String>,
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpSyncEndpoint {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("HttpSyncEndpoint")
            .field("base_url", &self.base_url)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish_non_exhaustive()
    }
}

impl HttpSyncEndpoint {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = normalize_base_url(base_url.into())?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            base_url,
            auth_token: None,
            client,
        })
    }

    /// Send `Authorization: Bearer <token>` with every request
    #[must_use]
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = normalize_text_option(Some(token.into()));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn item_url(&self, item: &QueueItem) -> String {
        format!(
            "{}/v1/sync/{}/{}",
            self.base_url,
            urlencoding::encode(&item.item_type),
            urlencoding::encode(&item.id)
        )
    }
}

impl SyncEndpoint for HttpSyncEndpoint {
    async fn apply(&self, item: &QueueItem) -> Result<ApplyOutcome> {
        let mut request = self
            .client
            .post(self.item_url(item))
            .header("Accept", "application/json")
            .json(item);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            tracing::debug!(item_id = %item.id, item_type = %item.item_type, "Item applied remotely");
            return Ok(ApplyOutcome::Applied);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::CONFLICT {
            return Ok(ApplyOutcome::Conflict {
                server_data: parse_conflict_body(&body),
            });
        }

        Err(Error::Endpoint(parse_api_error(status, &body)))
    }
}

const CONFLICT_DATA_FIELDS: [&str; 3] = ["server_data", "serverData", "data"];

/// Extract the server's version of a record from a 409 response body.
///
/// Accepts `server_data`, `serverData` or `data` wrappers and falls back to
/// the whole body (or `null` when the body is not JSON).
fn parse_conflict_body(body: &str) -> serde_json::Value {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return serde_json::Value::Null;
    };
    if let Some(fields) = value.as_object() {
        if let Some(data) = CONFLICT_DATA_FIELDS
            .iter()
            .find_map(|field| fields.get(*field))
        {
            return data.clone();
        }
    }
    value
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", compact_text(&message), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

fn normalize_base_url(raw: String) -> Result<String> {
    let url = normalize_text_option(Some(raw))
        .ok_or_else(|| Error::Config("sync endpoint URL must not be empty".to_string()))?;
    if is_http_url(&url) {
        Ok(url.trim_end_matches('/').to_string())
    } else {
        Err(Error::Config(
            "sync endpoint URL must include http:// or https://".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QueueItemDraft;
    use serde_json::json;

    #[test]
    fn normalize_base_url_rejects_invalid_values() {
        assert!(normalize_base_url(String::new()).is_err());
        assert!(normalize_base_url("api.example.com".to_string()).is_err());
        assert_eq!(
            normalize_base_url(" https://api.example.com/ ".to_string()).unwrap(),
            "https://api.example.com"
        );
    }

    #[test]
    fn item_url_encodes_segments() {
        let endpoint = HttpSyncEndpoint::new("https://api.example.com").unwrap();
        let item = QueueItemDraft::new("card art", json!({}))
            .with_id("a/b")
            .into_item();
        assert_eq!(
            endpoint.item_url(&item),
            "https://api.example.com/v1/sync/card%20art/a%2Fb"
        );
    }

    #[test]
    fn conflict_body_prefers_server_data() {
        assert_eq!(
            parse_conflict_body(r#"{"server_data": {"hp": 90}, "data": {"hp": 1}}"#),
            json!({"hp": 90})
        );
        assert_eq!(
            parse_conflict_body(r#"{"serverData": {"hp": 80}}"#),
            json!({"hp": 80})
        );
        assert_eq!(parse_conflict_body(r#"{"data": [1, 2]}"#), json!([1, 2]));
        assert_eq!(parse_conflict_body("[1, 2]"), json!([1, 2]));
        assert_eq!(parse_conflict_body(r#"{"hp": 70}"#), json!({"hp": 70}));
        assert_eq!(parse_conflict_body("not json"), serde_json::Value::Null);
    }

    #[test]
    fn api_error_uses_message_field() {
        assert_eq!(
            parse_api_error(StatusCode::BAD_REQUEST, r#"{"message": "bad card"}"#),
            "bad card (400)"
        );
        assert_eq!(parse_api_error(StatusCode::BAD_GATEWAY, ""), "HTTP 502");
        assert_eq!(
            parse_api_error(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            "boom (500)"
        );
    }

    #[test]
    fn debug_redacts_auth_token() {
        let endpoint = HttpSyncEndpoint::new("https://api.example.com")
            .unwrap()
            .with_auth_token("secret");
        let debug = format!("{endpoint:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
