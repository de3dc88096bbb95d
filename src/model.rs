//! Data models for the URL shortener
//!
//! The stored record plus the request/response payloads of the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A short link mapping as persisted in storage
///
/// Serialized as-is for `GET /`, so the field names are part of the API.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ShortMapping {
    /// Random v4 UUID, generated server-side
    pub id: Uuid,

    /// Destination the short link redirects to
    pub original_url: String,

    /// Fully-qualified short link, always `{public_url}/{id}`
    pub short_url: String,

    /// After this instant the mapping is treated as gone. `None` never expires.
    pub expires_at: Option<DateTime<Utc>>,
}

impl ShortMapping {
    pub fn new(
        id: Uuid,
        original_url: String,
        public_url: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            original_url,
            short_url: format!("{}/{}", public_url.trim_end_matches('/'), id),
            expires_at,
        }
    }

    /// True when `expires_at` is set and strictly before `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at < now)
    }
}

/// Request payload for `POST /`
///
/// ```json
/// {
///   "url": "https://example.com/very/long/url",
///   "key": "my-api-key",
///   "expiration": "2030-01-01T00:00:00.000Z"
/// }
/// ```
#[derive(Deserialize, Debug)]
pub struct CreateRequest {
    pub url: String,
    pub key: String,
    /// ISO 8601 date-time, optional
    pub expiration: Option<String>,
}

/// Response returned after creating a short URL
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateResponse {
    pub short_url: String,
}

/// Query parameters for `DELETE /{id}`
#[derive(Deserialize, Debug)]
pub struct DeleteParams {
    pub key: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn short_url_is_derived_from_id() {
        let id = Uuid::new_v4();
        let mapping = ShortMapping::new(id, "https://example.com".into(), "http://sho.rt/", None);
        assert_eq!(mapping.short_url, format!("http://sho.rt/{id}"));
    }

    #[test]
    fn expiry_is_strict() {
        let now = Utc::now();
        let mut mapping =
            ShortMapping::new(Uuid::new_v4(), "https://example.com".into(), "http://x", None);
        assert!(!mapping.is_expired_at(now));

        mapping.expires_at = Some(now);
        assert!(!mapping.is_expired_at(now));

        mapping.expires_at = Some(now - Duration::seconds(1));
        assert!(mapping.is_expired_at(now));
    }

    #[test]
    fn create_response_uses_camel_case() {
        let body = serde_json::to_value(CreateResponse {
            short_url: "http://x/1".into(),
        })
        .unwrap();
        assert_eq!(body["shortUrl"], "http://x/1");
    }
}
