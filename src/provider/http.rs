//! HTTP client for the provider's API

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AccountStatus, ProviderEntry, ProviderError, SendLogProvider};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the provider's JSON API
///
/// The API authenticates by carrying the key in each request body. The HTTP
/// timeout bounds every call; it is unrelated to the grace window the
/// reconciliation decision uses.
#[derive(Debug, Clone)]
pub struct HttpProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    key: &'a str,
    query: String,
    date_from: DateTime<Utc>,
    date_to: DateTime<Utc>,
}

#[derive(Deserialize)]
struct SeriesEntry {
    time: DateTime<Utc>,
    sent: u64,
}

#[derive(Serialize)]
struct StatusRequest<'a> {
    key: &'a str,
}

#[derive(Deserialize)]
struct StatusResponse {
    reputation: i64,
    hourly_quota: i64,
}

impl HttpProvider {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_timeout(base_url, api_key, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    async fn post_json<Req: Serialize, Resp: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        request: &Req,
    ) -> Result<Resp, ProviderError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

#[async_trait]
impl SendLogProvider for HttpProvider {
    async fn search_sent_in_range(
        &self,
        to: &str,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<ProviderEntry>, ProviderError> {
        let request = SearchRequest {
            key: &self.api_key,
            query: format!("full_email:{}", to),
            date_from: from,
            date_to: until,
        };

        let series: Vec<SeriesEntry> = self
            .post_json("/messages/search-time-series", &request)
            .await?;

        tracing::debug!(to = %to, entries = series.len(), "Provider send series fetched");

        Ok(series
            .into_iter()
            .map(|entry| ProviderEntry {
                time: entry.time,
                sent: entry.sent,
            })
            .collect())
    }

    async fn account_status(&self) -> Result<AccountStatus, ProviderError> {
        let request = StatusRequest { key: &self.api_key };
        let status: StatusResponse = self.post_json("/users/info", &request).await?;

        Ok(AccountStatus {
            reputation: status.reputation,
            hourly_quota: status.hourly_quota,
        })
    }
}
