//! Date-range selection and filtering.

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::str::FromStr;

use crate::error::{DashboardError, DashboardResult};
use crate::types::Dataset;

/// The user's range choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "range", rename_all = "snake_case")]
pub enum WindowSelector {
    Last7Days,
    Last15Days,
    Last30Days,
    All,
    Custom { start: NaiveDate, end: NaiveDate },
}

impl WindowSelector {
    /// Names accepted by [`WindowSelector::from_parts`], in display order.
    pub const NAMES: [&'static str; 5] = ["last7", "last15", "last30", "all", "custom"];

    /// Build a selector from a range name and, for `custom`, two dates.
    pub fn from_parts(
        range: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> DashboardResult<Self> {
        match range.trim().to_ascii_lowercase().as_str() {
            "last7" | "last_7_days" | "7d" | "week" => Ok(WindowSelector::Last7Days),
            "last15" | "last_15_days" | "15d" => Ok(WindowSelector::Last15Days),
            "last30" | "last_30_days" | "30d" | "month" => Ok(WindowSelector::Last30Days),
            "all" => Ok(WindowSelector::All),
            "custom" => {
                let start = required_date("start", start)?;
                let end = required_date("end", end)?;
                Ok(WindowSelector::Custom { start, end })
            }
            other => Err(DashboardError::InvalidWindow(format!(
                "unknown range {other:?}, expected one of {}",
                Self::NAMES.join(", ")
            ))),
        }
    }

    /// Day count for the trailing windows.
    pub fn trailing_days(&self) -> Option<i64> {
        match self {
            WindowSelector::Last7Days => Some(7),
            WindowSelector::Last15Days => Some(15),
            WindowSelector::Last30Days => Some(30),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WindowSelector::Last7Days => "last 7 days",
            WindowSelector::Last15Days => "last 15 days",
            WindowSelector::Last30Days => "last 30 days",
            WindowSelector::All => "all",
            WindowSelector::Custom { .. } => "custom",
        }
    }
}

impl FromStr for WindowSelector {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_parts(s, None, None)
    }
}

fn required_date(name: &str, raw: Option<&str>) -> DashboardResult<NaiveDate> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| DashboardError::InvalidWindow(format!("custom range needs a {name} date")))?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| DashboardError::InvalidWindow(format!("{name} date {raw:?} is not YYYY-MM-DD")))
}

/// Inclusive calendar-date bounds; `start_date <= end_date` always holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl DateWindow {
    /// Inverted bounds are swapped.
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        if a <= b {
            Self {
                start_date: a,
                end_date: b,
            }
        } else {
            tracing::debug!(start = %a, end = %b, "swapping inverted date window");
            Self {
                start_date: b,
                end_date: a,
            }
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Resolve a selector against the observed `(min, max)` dates.
///
/// Trailing windows end at the latest observed date and start N days before
/// it. Without any observed dates only a custom window can be resolved.
pub fn resolve_window(
    selector: &WindowSelector,
    observed: Option<(NaiveDate, NaiveDate)>,
) -> Option<DateWindow> {
    match *selector {
        WindowSelector::Custom { start, end } => Some(DateWindow::new(start, end)),
        WindowSelector::All => observed.map(|(min, max)| DateWindow::new(min, max)),
        _ => {
            let days = selector.trailing_days()?;
            let (_, max) = observed?;
            Some(DateWindow::new(max - Duration::days(days), max))
        }
    }
}

/// Keep the rows of each collection whose date falls inside `window`.
pub fn filter_dataset(dataset: &Dataset, window: &DateWindow) -> Dataset {
    Dataset {
        sleep: dataset
            .sleep
            .iter()
            .filter(|r| window.contains(r.date))
            .cloned()
            .collect(),
        feeding: dataset
            .feeding
            .iter()
            .filter(|r| window.contains(r.date))
            .cloned()
            .collect(),
    }
}
