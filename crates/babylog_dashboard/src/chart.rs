//! Renderer-facing chart payloads.
//!
//! A [`Figure`] is a list of named series of `(x, y)` points with per-point
//! style hints, plus axis hints. Layout, legends and interactivity belong to
//! whatever draws it.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::domains::daily::DailyTotals;
use crate::domains::timeline::{REFERENCE_DATE, Timeline, on_reference};
use crate::types::FeedingKind;

pub const SLEEP_COLOR: &str = "rgb(68, 114, 196)";
pub const MILK_COLOR: &str = "rgb(255, 192, 0)";
pub const DEFAULT_FEEDING_COLOR: &str = "rgb(128, 128, 128)";
pub const SLEEP_LINE_WIDTH: f64 = 20.0;

const MIN_TIMELINE_HEIGHT: u32 = 600;
const ROW_HEIGHT: u32 = 30;
const DAILY_HEIGHT: u32 = 800;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AxisValue {
    Instant(NaiveDateTime),
    Date(NaiveDate),
    Number(f64),
    Category(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesMode {
    Lines,
    Markers,
    LinesMarkersText,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Point {
    pub x: AxisValue,
    pub y: AxisValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub mode: SeriesMode,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    pub show_legend: bool,
    /// Sub-plot index, 0-based.
    pub panel: usize,
    pub points: Vec<Point>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Tick {
    pub value: AxisValue,
    pub text: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<(AxisValue, AxisValue)>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ticks: Vec<Tick>,
    /// Explicit category order; empty for continuous axes.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    pub reversed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick_format: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Figure {
    pub title: String,
    pub height: u32,
    pub x_axis: Axis,
    /// One y axis per panel.
    pub y_axes: Vec<Axis>,
    pub series: Vec<Series>,
}

/// Marker color for a feeding kind; unrecognized kinds share a default.
pub fn feeding_color(kind: &FeedingKind) -> &'static str {
    match kind {
        FeedingKind::Direct => "rgb(255, 182, 193)",
        FeedingKind::Formula => "rgb(255, 192, 0)",
        FeedingKind::BottledBreastMilk => "rgb(173, 216, 230)",
        FeedingKind::Unspecified | FeedingKind::Other(_) => DEFAULT_FEEDING_COLOR,
    }
}

pub fn timeline_height(rows: usize) -> u32 {
    let rows = u32::try_from(rows).unwrap_or(u32::MAX);
    MIN_TIMELINE_HEIGHT.max(rows.saturating_mul(ROW_HEIGHT))
}

fn hour_axis() -> Axis {
    let day_start = on_reference(NaiveTime::MIN);
    let ticks = (0..24)
        .map(|h| Tick {
            value: AxisValue::Instant(day_start + Duration::hours(h)),
            text: h.to_string(),
        })
        .collect();
    Axis {
        range: Some((
            AxisValue::Instant(day_start),
            AxisValue::Instant((REFERENCE_DATE + Duration::days(1)).and_time(NaiveTime::MIN)),
        )),
        ticks,
        tick_format: Some("%H".into()),
        ..Axis::default()
    }
}

/// Sleep bars and feeding markers on a shared 0–24h axis.
pub fn timeline_figure(timeline: &Timeline) -> Figure {
    let categories: Vec<String> = timeline.categories.iter().map(|c| c.label()).collect();

    let mut series: Vec<Series> = timeline
        .sleep
        .iter()
        .map(|seg| {
            let y = AxisValue::Category(seg.category.label());
            Series {
                name: "sleep".into(),
                mode: SeriesMode::Lines,
                color: SLEEP_COLOR.into(),
                width: Some(SLEEP_LINE_WIDTH),
                show_legend: false,
                panel: 0,
                points: vec![
                    Point {
                        x: AxisValue::Instant(seg.start),
                        y: y.clone(),
                        size: None,
                        label: Some(seg.hover.clone()),
                    },
                    Point {
                        x: AxisValue::Instant(seg.end),
                        y,
                        size: None,
                        label: Some(seg.hover.clone()),
                    },
                ],
            }
        })
        .collect();

    series.extend(timeline.feeding.iter().map(|fs| Series {
        name: fs.kind.label().to_string(),
        mode: SeriesMode::Markers,
        color: feeding_color(&fs.kind).into(),
        width: None,
        show_legend: true,
        panel: 0,
        points: fs
            .markers
            .iter()
            .map(|m| Point {
                x: AxisValue::Instant(m.at),
                y: AxisValue::Category(m.category.label()),
                size: Some(m.size),
                label: Some(m.hover.clone()),
            })
            .collect(),
    }));

    Figure {
        title: "Sleep and feeding".into(),
        height: timeline_height(categories.len()),
        x_axis: hour_axis(),
        y_axes: vec![Axis {
            categories,
            reversed: true,
            ..Axis::default()
        }],
        series,
    }
}

/// Daily sleep hours (panel 0) and milk volume (panel 1).
pub fn daily_figure(totals: &DailyTotals) -> Figure {
    let sleep = Series {
        name: "sleep (hours)".into(),
        mode: SeriesMode::LinesMarkersText,
        color: SLEEP_COLOR.into(),
        width: None,
        show_legend: true,
        panel: 0,
        points: totals
            .sleep
            .iter()
            .map(|day| Point {
                x: AxisValue::Date(day.date),
                y: AxisValue::Number(day.hours),
                size: None,
                label: Some(format!("{:.1}h", day.hours)),
            })
            .collect(),
    };
    let milk = Series {
        name: "milk (ml)".into(),
        mode: SeriesMode::LinesMarkersText,
        color: MILK_COLOR.into(),
        width: None,
        show_legend: true,
        panel: 1,
        points: totals
            .milk
            .iter()
            .map(|day| Point {
                x: AxisValue::Date(day.date),
                y: AxisValue::Number(day.volume_ml),
                size: None,
                label: Some(format!("{}ml", day.volume_ml.trunc() as i64)),
            })
            .collect(),
    };

    Figure {
        title: "Daily totals".into(),
        height: DAILY_HEIGHT,
        x_axis: Axis::default(),
        y_axes: vec![
            Axis {
                title: Some("sleep (hours)".into()),
                tick_format: Some(".1f".into()),
                ..Axis::default()
            },
            Axis {
                title: Some("milk (ml)".into()),
                tick_format: Some("d".into()),
                ..Axis::default()
            },
        ],
        series: vec![sleep, milk],
    }
}
