//! Minimal `DataSource` trait plus reqwest- and filesystem-backed implementations.
//!
//! A data source knows how to fetch one of the two baby-log tables by its
//! logical name and hand it back as a positional [`RawTable`]. It does not
//! interpret cells; that is the dashboard's job.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub mod config;
pub mod delimited;
pub mod file_source;
pub mod http_client;
pub mod retry;

pub use config::Config;
pub use delimited::Delimiter;

#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl DataSourceError {
    /// The resource could not be reached or did not return a body.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            DataSourceError::Http(_)
                | DataSourceError::Status { .. }
                | DataSourceError::Io(_)
                | DataSourceError::Timeout(_)
        )
    }

    /// The body arrived but is not a well-formed delimited table.
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, DataSourceError::Parse(_))
    }

    /// Transport errors and server-side statuses are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            DataSourceError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            DataSourceError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// Logical name of one of the two tables the dashboard needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableName {
    Sleep,
    Feeding,
}

impl TableName {
    pub fn as_str(self) -> &'static str {
        match self {
            TableName::Sleep => "sleep",
            TableName::Feeding => "feeding",
        }
    }

    /// Default object key (file stem) under the source root.
    pub fn default_object(self) -> &'static str {
        match self {
            TableName::Sleep => "sleep_data",
            TableName::Feeding => "feeding_data",
        }
    }
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A table as it arrived: a header row and data rows of trimmed cells.
///
/// Columns are positional. The header is kept for diagnostics only and is
/// never matched by name; an empty cell is an absent value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Fetch raw tables by logical name.
#[async_trait]
pub trait DataSource: Send + Sync + 'static {
    async fn fetch_table(&self, table: TableName) -> Result<RawTable, DataSourceError>;

    /// Human-readable origin used in log lines.
    fn describe(&self) -> String;
}

/// Pick the implementation matching `cfg.source`: `http(s)://` URLs go
/// through [`http_client::HttpDataSource`], anything else is a local directory.
pub fn build_source(cfg: &Config) -> Result<Arc<dyn DataSource>, DataSourceError> {
    if cfg.is_remote() {
        Ok(Arc::new(http_client::HttpDataSource::from_config(cfg)?))
    } else {
        Ok(Arc::new(file_source::FileDataSource::from_config(cfg)))
    }
}
