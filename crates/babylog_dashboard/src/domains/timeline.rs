//! Timeline series: every record placed on one synthetic reference day.
//!
//! The x axis carries time of day only. Which real date a point belongs to
//! is encoded by its category row (`"{date} sleep"` / `"{date} feeding"`),
//! never by the x coordinate.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use super::clock::format_clock;
use crate::types::{Dataset, FeedingKind, FeedingRecord, SleepRecord};

/// Fixed day every time of day is anchored to.
pub const REFERENCE_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2000, 1, 1) {
    Some(d) => d,
    None => panic!("reference date is valid"),
};

pub const MIN_MARKER_SIZE: f64 = 8.0;
pub const MAX_MARKER_SIZE: f64 = 20.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    Sleep,
    Feeding,
}

impl RowKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RowKind::Sleep => "sleep",
            RowKind::Feeding => "feeding",
        }
    }
}

/// One category row. Orders by real date, then sleep before feeding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Category {
    pub date: NaiveDate,
    pub kind: RowKind,
}

impl Category {
    pub fn new(date: NaiveDate, kind: RowKind) -> Self {
        Self { date, kind }
    }

    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date.format("%Y-%m-%d"), self.kind.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SleepSegment {
    pub category: Category,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// `end - start` on the reference timeline, after rollover.
    pub span_minutes: i64,
    /// The record's own duration field; may disagree with `span_minutes`.
    pub recorded_minutes: Option<f64>,
    pub crosses_midnight: bool,
    pub hover: String,
}

impl SleepSegment {
    pub fn recorded_hours(&self) -> Option<f64> {
        self.recorded_minutes.map(|m| m / 60.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FeedingMarker {
    pub category: Category,
    pub at: NaiveDateTime,
    pub volume_ml: Option<f64>,
    pub size: f64,
    pub hover: String,
}

/// All markers of one feeding kind; one legend entry per series.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FeedingSeries {
    pub kind: FeedingKind,
    pub markers: Vec<FeedingMarker>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    UnknownSleepStart,
    UnknownSleepEnd,
    UnknownFeedingTime,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SkipReason::UnknownSleepStart => "unknown sleep start",
            SkipReason::UnknownSleepEnd => "unknown sleep end",
            SkipReason::UnknownFeedingTime => "unknown feeding time",
        })
    }
}

/// A record left off the timeline, kept so the caller can report it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SkippedRecord {
    pub category: Category,
    pub reason: SkipReason,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Timeline {
    /// Every category row, in display order.
    pub categories: Vec<Category>,
    pub sleep: Vec<SleepSegment>,
    pub feeding: Vec<FeedingSeries>,
    pub skipped: Vec<SkippedRecord>,
}

/// Anchor a time of day on the reference date.
pub fn on_reference(time: NaiveTime) -> NaiveDateTime {
    REFERENCE_DATE.and_time(time)
}

/// Map a sleep interval onto the reference day. An end earlier than the
/// start is taken to be on the following day.
pub fn place_interval(start: NaiveTime, end: NaiveTime) -> (NaiveDateTime, NaiveDateTime) {
    let start_at = on_reference(start);
    let mut end_at = on_reference(end);
    if end_at < start_at {
        end_at += Duration::days(1);
    }
    (start_at, end_at)
}

/// Marker size: a tenth of the volume, clamped to `[8, 20]`; 8 when unknown.
pub fn marker_size(volume_ml: Option<f64>) -> f64 {
    match volume_ml {
        Some(v) => (v / 10.0).clamp(MIN_MARKER_SIZE, MAX_MARKER_SIZE),
        None => MIN_MARKER_SIZE,
    }
}

pub fn sleep_segment(record: &SleepRecord) -> Result<SleepSegment, SkipReason> {
    let start = record.sleep_start.ok_or(SkipReason::UnknownSleepStart)?;
    let end = record.sleep_end.ok_or(SkipReason::UnknownSleepEnd)?;
    let (start_at, end_at) = place_interval(start, end);

    let duration = match record.duration_minutes {
        Some(m) => format!("{:.1}h", m / 60.0),
        None => "unknown".to_string(),
    };
    Ok(SleepSegment {
        category: Category::new(record.date, RowKind::Sleep),
        start: start_at,
        end: end_at,
        span_minutes: (end_at - start_at).num_minutes(),
        recorded_minutes: record.duration_minutes,
        crosses_midnight: end_at.date() > REFERENCE_DATE,
        hover: format!(
            "start {} · end {} · duration {}",
            format_clock(start),
            format_clock(end),
            duration
        ),
    })
}

pub fn feeding_marker(record: &FeedingRecord) -> Result<FeedingMarker, SkipReason> {
    let time = record.feeding_time.ok_or(SkipReason::UnknownFeedingTime)?;
    let volume = match record.volume_ml {
        Some(v) => format!("{v}ml"),
        None => "unknown".to_string(),
    };
    Ok(FeedingMarker {
        category: Category::new(record.date, RowKind::Feeding),
        at: on_reference(time),
        volume_ml: record.volume_ml,
        size: marker_size(record.volume_ml),
        hover: format!("{}: {}", record.feeding_type, volume),
    })
}

/// Build the timeline for an already-filtered dataset.
pub fn build_timeline(dataset: &Dataset) -> Timeline {
    let categories = dataset
        .dates()
        .into_iter()
        .flat_map(|date| {
            [
                Category::new(date, RowKind::Sleep),
                Category::new(date, RowKind::Feeding),
            ]
        })
        .collect();

    let mut timeline = Timeline {
        categories,
        ..Timeline::default()
    };

    for record in &dataset.sleep {
        match sleep_segment(record) {
            Ok(segment) => timeline.sleep.push(segment),
            Err(reason) => timeline.skipped.push(SkippedRecord {
                category: Category::new(record.date, RowKind::Sleep),
                reason,
            }),
        }
    }

    let mut by_kind: BTreeMap<FeedingKind, Vec<FeedingMarker>> = BTreeMap::new();
    for record in &dataset.feeding {
        match feeding_marker(record) {
            Ok(marker) => by_kind
                .entry(record.feeding_type.clone())
                .or_default()
                .push(marker),
            Err(reason) => timeline.skipped.push(SkippedRecord {
                category: Category::new(record.date, RowKind::Feeding),
                reason,
            }),
        }
    }
    // FeedingKind orders the known kinds first, then unspecified, then Other by label
    timeline.feeding = by_kind
        .into_iter()
        .map(|(kind, markers)| FeedingSeries { kind, markers })
        .collect();

    for skipped in &timeline.skipped {
        tracing::debug!(category = %skipped.category, reason = %skipped.reason, "record left off timeline");
    }
    timeline
}
