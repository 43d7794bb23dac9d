//! Row normalization: positional raw tables into typed records.
//!
//! Columns are taken by position, never by header name. Dates are strict
//! (one bad date fails the table); times and numbers are tolerant (a bad cell
//! becomes unknown and the row is kept).

use babylog_client::{RawTable, TableName};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::clock::parse_clock;
use crate::error::{DashboardError, DashboardResult};
use crate::types::{Dataset, FeedingKind, FeedingRecord, SleepRecord};

/// Both tables must have exactly this many columns.
pub const EXPECTED_COLUMNS: usize = 4;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Cells that were present but degraded to unknown while normalizing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub rows: usize,
    pub unknown_cells: usize,
}

/// Why a single row could not become a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowError {
    /// The date cell did not parse. Fatal for the whole table.
    Date(String),
}

/// Normalize both tables together.
///
/// Column counts are checked for both tables before any row is read, so a
/// mismatch in either aborts the load for both.
pub fn normalize_tables(sleep: &RawTable, feeding: &RawTable) -> DashboardResult<Dataset> {
    check_schema(TableName::Sleep, sleep)?;
    check_schema(TableName::Feeding, feeding)?;

    let (sleep, sleep_report) = normalize_sleep(sleep)?;
    let (feeding, feeding_report) = normalize_feeding(feeding)?;
    record_report(TableName::Sleep, sleep_report);
    record_report(TableName::Feeding, feeding_report);

    Ok(Dataset { sleep, feeding })
}

pub fn check_schema(table: TableName, raw: &RawTable) -> DashboardResult<()> {
    if raw.column_count() != EXPECTED_COLUMNS {
        return Err(DashboardError::SchemaMismatch {
            table,
            found: raw.column_count(),
            expected: EXPECTED_COLUMNS,
        });
    }
    Ok(())
}

/// Sleep columns: date, sleep_start, sleep_end, duration_minutes.
pub fn normalize_sleep(raw: &RawTable) -> DashboardResult<(Vec<SleepRecord>, NormalizeReport)> {
    check_schema(TableName::Sleep, raw)?;
    normalize_rows(TableName::Sleep, raw, normalize_sleep_row)
}

/// Feeding columns: date, feeding_type, feeding_time, volume_ml.
pub fn normalize_feeding(
    raw: &RawTable,
) -> DashboardResult<(Vec<FeedingRecord>, NormalizeReport)> {
    check_schema(TableName::Feeding, raw)?;
    normalize_rows(TableName::Feeding, raw, normalize_feeding_row)
}

fn normalize_rows<T>(
    table: TableName,
    raw: &RawTable,
    row_fn: fn(&[String], &mut usize) -> Result<T, RowError>,
) -> DashboardResult<(Vec<T>, NormalizeReport)> {
    let mut report = NormalizeReport::default();
    let mut out = Vec::with_capacity(raw.len());
    for (idx, cells) in raw.rows.iter().enumerate() {
        match row_fn(cells, &mut report.unknown_cells) {
            Ok(record) => out.push(record),
            Err(RowError::Date(value)) => {
                return Err(DashboardError::DateParse {
                    table,
                    row: idx + 1,
                    value,
                });
            }
        }
    }
    report.rows = out.len();
    Ok((out, report))
}

pub fn normalize_sleep_row(cells: &[String], unknown: &mut usize) -> Result<SleepRecord, RowError> {
    let date = parse_date(cell(cells, 0)).ok_or_else(|| RowError::Date(owned(cells, 0)))?;
    Ok(SleepRecord {
        date,
        sleep_start: track(cell(cells, 1), parse_clock(cell(cells, 1)), unknown),
        sleep_end: track(cell(cells, 2), parse_clock(cell(cells, 2)), unknown),
        duration_minutes: track(cell(cells, 3), parse_amount(cell(cells, 3)), unknown),
    })
}

pub fn normalize_feeding_row(
    cells: &[String],
    unknown: &mut usize,
) -> Result<FeedingRecord, RowError> {
    let date = parse_date(cell(cells, 0)).ok_or_else(|| RowError::Date(owned(cells, 0)))?;
    Ok(FeedingRecord {
        date,
        feeding_type: FeedingKind::parse(cell(cells, 1).unwrap_or_default()),
        feeding_time: track(cell(cells, 2), parse_clock(cell(cells, 2)), unknown),
        volume_ml: track(cell(cells, 3), parse_amount(cell(cells, 3)), unknown),
    })
}

/// Parse a calendar date. Accepts date-only forms, naive datetimes and RFC
/// 3339; any time part is discarded.
pub fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    let s = raw?.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(d) = DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
    {
        return Some(d);
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
    {
        return Some(dt.date());
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// Coerce a numeric cell: finite and non-negative, otherwise unknown.
pub fn parse_amount(raw: Option<&str>) -> Option<f64> {
    let v: f64 = raw?.trim().parse().ok()?;
    (v.is_finite() && v >= 0.0).then_some(v)
}

fn cell(cells: &[String], idx: usize) -> Option<&str> {
    cells.get(idx).map(String::as_str).filter(|c| !c.trim().is_empty())
}

fn owned(cells: &[String], idx: usize) -> String {
    cells.get(idx).cloned().unwrap_or_default()
}

// counts cells that had content but did not coerce
fn track<T>(raw: Option<&str>, parsed: Option<T>, unknown: &mut usize) -> Option<T> {
    if raw.is_some() && parsed.is_none() {
        *unknown += 1;
    }
    parsed
}

fn record_report(table: TableName, report: NormalizeReport) {
    metrics::counter!("babylog_rows_loaded_total", "table" => table.as_str())
        .increment(report.rows as u64);
    if report.unknown_cells > 0 {
        metrics::counter!("babylog_cells_unknown_total", "table" => table.as_str())
            .increment(report.unknown_cells as u64);
        tracing::debug!(
            %table,
            unknown_cells = report.unknown_cells,
            "cells degraded to unknown"
        );
    }
}
