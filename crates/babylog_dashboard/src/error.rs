//! Custom error types for the dashboard pipeline.

use babylog_client::{DataSourceError, TableName};
use thiserror::Error;

/// Failures that abort a dashboard load or request.
///
/// Per-cell coercion problems never show up here; they degrade to unknown.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("fetching {table} table failed: {source}")]
    Fetch {
        table: TableName,
        #[source]
        source: DataSourceError,
    },

    #[error("schema mismatch: {table} table has {found} columns, expected {expected}")]
    SchemaMismatch {
        table: TableName,
        found: usize,
        expected: usize,
    },

    #[error("{table} table row {row}: unparseable date {value:?}")]
    DateParse {
        table: TableName,
        row: usize,
        value: String,
    },

    #[error("invalid date window: {0}")]
    InvalidWindow(String),
}

impl DashboardError {
    /// Short label used as a metrics dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            DashboardError::Fetch { source, .. } if source.is_parse_failure() => "parse",
            DashboardError::Fetch { .. } => "fetch",
            DashboardError::SchemaMismatch { .. } => "schema",
            DashboardError::DateParse { .. } => "date",
            DashboardError::InvalidWindow(_) => "window",
        }
    }

    /// The single sentence shown to the user in place of the charts.
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::Fetch { table, source } if source.is_parse_failure() => {
                format!("The {table} log could not be read: {source}")
            }
            DashboardError::Fetch { table, .. } => {
                format!("The {table} log could not be fetched; no data to show.")
            }
            DashboardError::SchemaMismatch { table, found, .. } => format!(
                "The {table} log has {found} columns instead of 4; no data to show."
            ),
            DashboardError::DateParse { table, row, value } => {
                format!("The {table} log has an invalid date {value:?} on row {row}.")
            }
            DashboardError::InvalidWindow(msg) => format!("Invalid date range: {msg}"),
        }
    }
}

/// Result type alias for dashboard operations.
pub type DashboardResult<T> = Result<T, DashboardError>;
