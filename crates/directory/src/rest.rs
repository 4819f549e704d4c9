//! REST implementation of [`DirectoryProvider`].
//!
//! `RestDirectoryClient` wraps a `reqwest::Client` and translates every
//! trait method into the corresponding HTTP call against the booking
//! service, with automatic retry + exponential back-off on transient
//! (5xx / timeout) failures. Name and city filters run client-side over
//! the catalog — the upstream offers no server-side filter for them.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use uuid::Uuid;

use ik_domain::config::DirectoryConfig;
use ik_domain::error::{Error, Result};

use crate::provider::DirectoryProvider;
use crate::types::{DataEnvelope, Property, Reservation};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A REST-based client for the property directory.
///
/// Created once at startup and reused for the lifetime of the process.
/// Immutable after construction — it never accumulates per-request state,
/// so sharing it across turns cannot leak stale availability data.
pub struct RestDirectoryClient {
    http: Client,
    base_url: String,
    api_token: Option<String>,
    max_retries: u32,
}

impl RestDirectoryClient {
    /// Build a new client from the shared [`DirectoryConfig`].
    ///
    /// `api_token` is the bearer token resolved from the configured env
    /// var; `None` means unauthenticated requests (the upstream will
    /// reject them, but startup should not fail on a missing secret).
    pub fn new(cfg: &DirectoryConfig, api_token: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_owned(),
            api_token,
            max_retries: cfg.max_retries,
        })
    }

    // ── request helpers ──────────────────────────────────────────────

    /// Decorate a `RequestBuilder` with the standard headers.
    fn decorate(&self, rb: RequestBuilder) -> RequestBuilder {
        let trace_id = Uuid::new_v4().to_string();
        let mut rb = rb
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .header("X-Trace-Id", &trace_id);
        if let Some(ref token) = self.api_token {
            rb = rb.bearer_auth(token);
        }
        rb
    }

    /// Build the full URL for a path like `/properties`.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ── retry engine ─────────────────────────────────────────────────

    /// Execute a request with retry + exponential back-off on transient errors.
    ///
    /// * Retries on 5xx status codes and on timeouts/connection errors.
    /// * Does **not** retry on 4xx (client errors are permanent):
    ///   401/403 map to `Error::Auth`, 404 to `Error::NotFound`, the rest
    ///   to `Error::Directory`.
    async fn execute_with_retry(
        &self,
        endpoint: &str,
        build_request: impl Fn() -> RequestBuilder,
    ) -> Result<Response> {
        let mut last_err: Option<Error> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = Duration::from_millis(100 * 2u64.pow(attempt - 1));
                tokio::time::sleep(backoff).await;
            }

            let rb = self.decorate(build_request());
            match rb.send().await {
                Ok(resp) => {
                    let status = resp.status();
                    tracing::debug!(endpoint, status = status.as_u16(), "directory call");

                    if status.is_server_error() {
                        // 5xx — transient, retry
                        let body = resp.text().await.unwrap_or_default();
                        last_err = Some(Error::Directory(format!(
                            "{endpoint} returned {}: {body}",
                            status.as_u16()
                        )));
                        continue;
                    }

                    if status.is_client_error() {
                        // 4xx — permanent, do NOT retry
                        let body = resp.text().await.unwrap_or_default();
                        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                            return Err(Error::Auth(format!(
                                "{endpoint} auth failed ({}): {body}",
                                status.as_u16()
                            )));
                        }
                        if status == StatusCode::NOT_FOUND {
                            return Err(Error::NotFound(endpoint.to_owned()));
                        }
                        return Err(Error::Directory(format!(
                            "{endpoint} returned {}: {body}",
                            status.as_u16()
                        )));
                    }

                    return Ok(resp);
                }
                Err(e) => {
                    // Timeouts and connection errors are transient — retry
                    last_err = Some(from_reqwest(e));
                    continue;
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| Error::Directory(format!("{endpoint}: all retries exhausted"))))
    }

    /// Execute, read the body, and decode the `{"data": ...}` envelope.
    async fn fetch_enveloped<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        build_request: impl Fn() -> RequestBuilder,
    ) -> Result<T> {
        let resp = self.execute_with_retry(endpoint, build_request).await?;
        let body = resp.text().await.map_err(from_reqwest)?;
        let envelope: DataEnvelope<T> = serde_json::from_str(&body).map_err(|e| {
            Error::Directory(format!("failed to parse {endpoint} response: {e}: {body}"))
        })?;
        Ok(envelope.data)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait]
impl DirectoryProvider for RestDirectoryClient {
    async fn list_properties(&self) -> Result<Vec<Property>> {
        let url = self.url("/properties");
        self.fetch_enveloped("GET /properties", || self.http.get(&url))
            .await
    }

    async fn get_property(&self, id: &str) -> Result<Property> {
        let url = self.url(&format!("/properties/{id}"));
        self.fetch_enveloped(&format!("GET /properties/{id}"), || self.http.get(&url))
            .await
    }

    async fn find_properties_by_name(&self, needle: &str) -> Result<Vec<Property>> {
        let all = self.list_properties().await?;
        Ok(filter_by_name(all, needle))
    }

    async fn find_properties_by_city(&self, needle: &str) -> Result<Vec<Property>> {
        let all = self.list_properties().await?;
        Ok(filter_by_city(all, needle))
    }

    async fn reservations(
        &self,
        property_ids: &[String],
        window: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<Reservation>> {
        let url = self.url("/reservations");

        let mut params: Vec<(String, String)> = property_ids
            .iter()
            .map(|id| ("properties[]".to_owned(), id.clone()))
            .collect();
        if let Some((start, end)) = window {
            params.push(("start_date".to_owned(), start.format("%Y-%m-%d").to_string()));
            params.push(("end_date".to_owned(), end.format("%Y-%m-%d").to_string()));
        }

        self.fetch_enveloped("GET /reservations", || self.http.get(&url).query(&params))
            .await
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Catalog filters & error conversion
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Case-insensitive substring filter on the property name.
fn filter_by_name(properties: Vec<Property>, needle: &str) -> Vec<Property> {
    let needle = needle.to_lowercase();
    properties
        .into_iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .collect()
}

/// Case-insensitive substring filter on the property's city.
fn filter_by_city(properties: Vec<Property>, needle: &str) -> Vec<Property> {
    let needle = needle.to_lowercase();
    properties
        .into_iter()
        .filter(|p| {
            p.address
                .city
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Convert a `reqwest::Error` into a domain `Error`.
fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Address;

    fn prop(id: &str, name: &str, city: Option<&str>) -> Property {
        Property {
            id: id.into(),
            name: name.into(),
            address: Address { city: city.map(Into::into), ..Default::default() },
            ..Default::default()
        }
    }

    #[test]
    fn name_filter_is_case_insensitive_substring() {
        let props = vec![
            prop("P1", "The Walk Flat", Some("Dubai")),
            prop("P2", "Marina Loft", Some("Dubai")),
        ];
        let hits = filter_by_name(props, "walk");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "P1");
    }

    #[test]
    fn name_filter_empty_when_nothing_matches() {
        let props = vec![prop("P1", "The Walk Flat", None)];
        assert!(filter_by_name(props, "chalet").is_empty());
    }

    #[test]
    fn city_filter_skips_properties_without_city() {
        let props = vec![
            prop("P1", "A", Some("Dubai")),
            prop("P2", "B", None),
            prop("P3", "C", Some("DUBAI Marina")),
        ];
        let hits = filter_by_city(props, "dubai");
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|p| p.id != "P2"));
    }
}
