//! Business rules around the storage layer
//!
//! `UrlService` owns the allow-list and public base URL and is the only
//! component that decides whether a mapping is live, expired or missing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::sync::Arc;
use url::Url;
use uuid::Uuid;

use crate::config::ApiKeys;
use crate::database::Repository;
use crate::error::{AppError, Result, StoreError};
use crate::model::ShortMapping;

#[derive(Clone)]
pub struct UrlService {
    repository: Arc<dyn Repository>,
    api_keys: ApiKeys,
    public_url: String,
}

impl UrlService {
    pub fn new(repository: Arc<dyn Repository>, api_keys: ApiKeys, public_url: &str) -> Self {
        Self {
            repository,
            api_keys,
            public_url: public_url.trim_end_matches('/').to_owned(),
        }
    }

    pub fn public_url(&self) -> &str {
        &self.public_url
    }

    /// Creates a mapping and returns its short URL.
    ///
    /// Input is validated before the key is checked, so a malformed request
    /// is reported as such even when the key is also wrong.
    pub async fn create(&self, url: &str, key: &str, expiration: Option<&str>) -> Result<String> {
        let original_url = validate_url(url)?;
        let expires_at = expiration.map(parse_expiration).transpose()?;
        self.authorize(key)?;

        let mapping = ShortMapping::new(Uuid::new_v4(), original_url, &self.public_url, expires_at);
        self.repository.insert(&mapping).await?;

        tracing::info!(
            id = %mapping.id,
            expires_at = ?mapping.expires_at,
            "created short url"
        );
        Ok(mapping.short_url)
    }

    /// Returns the destination for a live mapping.
    pub async fn resolve(&self, id: &Uuid) -> Result<String> {
        let mapping = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)?;

        if mapping.is_expired_at(Utc::now()) {
            tracing::debug!(%id, "lookup of expired short url");
            return Err(AppError::Gone);
        }

        tracing::debug!(%id, "resolved short url");
        Ok(mapping.original_url)
    }

    pub async fn delete(&self, id: &Uuid, key: &str) -> Result<()> {
        self.authorize(key)?;

        match self.repository.delete_by_id(id).await? {
            0 => Err(AppError::NotFound),
            _ => {
                tracing::info!(%id, "deleted short url");
                Ok(())
            }
        }
    }

    /// Raw dump of storage, including expired rows the sweeper has not reached yet.
    pub async fn list_all(&self) -> Result<Vec<ShortMapping>> {
        let mappings = self.repository.find_all().await?;
        tracing::debug!(count = mappings.len(), "listed short urls");
        Ok(mappings)
    }

    /// Physically removes mappings that expired before `now`.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        self.repository.delete_expired_before(now).await
    }

    fn authorize(&self, key: &str) -> Result<()> {
        if self.api_keys.contains(key) {
            Ok(())
        } else {
            tracing::warn!("rejected request with unknown API key");
            Err(AppError::Unauthorized)
        }
    }
}

/// Accepts absolute http(s) URLs with a host and returns the form to store.
///
/// Input that `Url::parse` would silently rewrite (surrounding whitespace,
/// embedded tabs or newlines) is rejected. Input made of visible ASCII only is
/// kept verbatim; anything else is stored in its percent-encoded serialization
/// so it can always be sent back in a `Location` header.
pub fn validate_url(raw: &str) -> Result<String> {
    if raw.trim() != raw || raw.chars().any(char::is_control) {
        return Err(AppError::invalid(
            "url",
            "URL must not contain whitespace padding or control characters",
        ));
    }

    let parsed = Url::parse(raw).map_err(|err| AppError::invalid("url", err.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(AppError::invalid(
                "url",
                format!("unsupported scheme: {scheme}"),
            ))
        }
    }

    if parsed.host().is_none() {
        return Err(AppError::invalid("url", "URL must have a host"));
    }

    if raw.bytes().all(|b| b.is_ascii_graphic()) {
        Ok(raw.to_owned())
    } else {
        Ok(String::from(parsed))
    }
}

/// Parses an ISO 8601 date-time.
///
/// Accepts RFC 3339 (`2030-01-01T00:00:00.000Z`, `2030-01-01T02:00:00+02:00`),
/// a date-time without offset (taken as UTC) or a bare date (midnight UTC).
pub fn parse_expiration(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    if let Some(midnight) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc());
    }

    Err(AppError::invalid(
        "expiration",
        format!("not an ISO 8601 date-time: {raw}"),
    ))
}
