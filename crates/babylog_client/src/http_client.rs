//! HTTP data source for raw tables kept behind a URL or an object-store key.
//!
//! This module provides a reqwest-based implementation of the [`DataSource`](crate::DataSource) trait.

use crate::delimited::{Delimiter, parse_table};
use crate::retry::RetryPolicy;
use crate::{Config, DataSource, DataSourceError, RawTable, TableName};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

/// Client for a remote table store using reqwest.
#[derive(Clone, Debug)]
pub struct HttpDataSource {
    base_url: String,
    sleep_object: String,
    feeding_object: String,
    delimiter: Delimiter,
    token: Option<SecretString>,
    retry: RetryPolicy,
    /// Budget for one `fetch_table` call, shared by all of its attempts.
    fetch_timeout: Duration,
    client: reqwest::Client,
}

impl HttpDataSource {
    /// Create a new source rooted at `base_url` using the default object names
    /// (`sleep_data.csv`, `feeding_data.csv`) and whitespace-separated cells.
    pub fn new(base_url: &str) -> Result<Self, DataSourceError> {
        Self::from_config(&Config {
            source: base_url.to_string(),
            ..Config::default()
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self, DataSourceError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| DataSourceError::Config(format!("http client: {e}")))?;
        Ok(Self {
            base_url: cfg.source.trim_end_matches('/').to_string(),
            sleep_object: cfg.object_name(TableName::Sleep),
            feeding_object: cfg.object_name(TableName::Feeding),
            delimiter: cfg.delimiter,
            token: cfg.api_token.clone(),
            retry: RetryPolicy::default(),
            fetch_timeout: cfg.fetch_timeout,
            client,
        })
    }

    pub fn with_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_token(mut self, token: SecretString) -> Self {
        self.token = Some(token);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Full URL of the object backing `table`.
    pub fn table_url(&self, table: TableName) -> String {
        let object = match table {
            TableName::Sleep => &self.sleep_object,
            TableName::Feeding => &self.feeding_object,
        };
        format!("{}/{}", self.base_url, object.trim_start_matches('/'))
    }

    /// Timeout for a single attempt: the fetch budget split evenly across
    /// every attempt the retry policy allows, so a timed-out attempt can still
    /// be retried inside the caller's deadline.
    pub fn attempt_timeout(&self) -> Duration {
        self.fetch_timeout / self.retry.max_retries.saturating_add(1)
    }

    /// Build a GET request, authenticated when a token is configured.
    fn get_request(&self, url: &str) -> reqwest::RequestBuilder {
        let req = self.client.get(url).timeout(self.attempt_timeout());
        match &self.token {
            Some(token) => req.bearer_auth(token.expose_secret()),
            None => req,
        }
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, DataSourceError> {
        let resp = self.get_request(url).send().await?;
        if !resp.status().is_success() {
            return Err(Self::error_from_response(resp).await);
        }
        Ok(resp.bytes().await?.to_vec())
    }

    /// Extract error information from a failed response.
    async fn error_from_response(resp: reqwest::Response) -> DataSourceError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        DataSourceError::Status {
            status,
            body: body.chars().take(256).collect(),
        }
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn fetch_table(&self, table: TableName) -> Result<RawTable, DataSourceError> {
        let url = self.table_url(table);
        tracing::debug!(%url, %table, "fetching table");
        let bytes = self
            .retry
            .retry_async(|| self.fetch_bytes(&url), DataSourceError::is_retryable)
            .await?;
        parse_table(&bytes, self.delimiter)
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_url_joins_base_and_object() {
        let src = HttpDataSource::new("https://example.test/data/").expect("source");
        assert_eq!(
            src.table_url(TableName::Sleep),
            "https://example.test/data/sleep_data.csv"
        );
        assert_eq!(
            src.table_url(TableName::Feeding),
            "https://example.test/data/feeding_data.csv"
        );
    }

    #[test]
    fn attempt_timeout_splits_fetch_budget() {
        let cfg = Config {
            source: "https://example.test".into(),
            fetch_timeout: Duration::from_secs(8),
            ..Config::default()
        };
        let src = HttpDataSource::from_config(&cfg).expect("source");
        assert_eq!(src.attempt_timeout(), Duration::from_secs(2));
        let src = src.with_retry(RetryPolicy::none());
        assert_eq!(src.attempt_timeout(), Duration::from_secs(8));
    }

    #[test]
    fn object_keys_come_from_config() {
        let cfg = Config {
            source: "https://bucket.example".into(),
            sleep_object: "/baby/sleep".into(),
            extension: "tsv".into(),
            ..Config::default()
        };
        let src = HttpDataSource::from_config(&cfg).expect("source");
        assert_eq!(
            src.table_url(TableName::Sleep),
            "https://bucket.example/baby/sleep.tsv"
        );
    }
}
