//! Canonical record types produced by the row normalizer.
//!
//! `None` in any time or numeric field is the "unknown" sentinel: the source
//! cell was absent or failed to coerce. It is never conflated with zero.

use chrono::{NaiveDate, NaiveTime};
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;

/// One sleep interval as recorded.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SleepRecord {
    pub date: NaiveDate,
    pub sleep_start: Option<NaiveTime>,
    pub sleep_end: Option<NaiveTime>,
    /// Duration as written in the log; never recomputed from start/end.
    pub duration_minutes: Option<f64>,
}

/// One feeding event as recorded.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FeedingRecord {
    pub date: NaiveDate,
    pub feeding_type: FeedingKind,
    pub feeding_time: Option<NaiveTime>,
    pub volume_ml: Option<f64>,
}

/// Feeding category. Unrecognized labels are kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeedingKind {
    Direct,
    Formula,
    BottledBreastMilk,
    /// The type cell was blank.
    Unspecified,
    Other(String),
}

impl FeedingKind {
    /// Map a source label onto a category. Accepts the labels used in the
    /// log files (亲喂, 配方奶, 母乳瓶喂) and their English names.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return FeedingKind::Unspecified;
        }
        match trimmed.to_lowercase().as_str() {
            "亲喂" | "direct" | "breast" | "breastfeeding" => FeedingKind::Direct,
            "配方奶" | "formula" => FeedingKind::Formula,
            "母乳瓶喂" | "bottled breast milk" | "bottled" | "bottle" => {
                FeedingKind::BottledBreastMilk
            }
            _ => FeedingKind::Other(trimmed.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            FeedingKind::Direct => "direct",
            FeedingKind::Formula => "formula",
            FeedingKind::BottledBreastMilk => "bottled breast milk",
            FeedingKind::Unspecified => "unspecified",
            FeedingKind::Other(label) => label,
        }
    }
}

impl std::fmt::Display for FeedingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for FeedingKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Both collections loaded by one pipeline invocation.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Dataset {
    pub sleep: Vec<SleepRecord>,
    pub feeding: Vec<FeedingRecord>,
}

impl Dataset {
    /// Sorted union of the dates present in either collection.
    pub fn dates(&self) -> BTreeSet<NaiveDate> {
        self.sleep
            .iter()
            .map(|r| r.date)
            .chain(self.feeding.iter().map(|r| r.date))
            .collect()
    }

    /// `(min, max)` over both collections, or `None` when both are empty.
    pub fn observed_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let dates = self.dates();
        Some((*dates.first()?, *dates.last()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn feeding_kind_parses_source_and_english_labels() {
        assert_eq!(FeedingKind::parse("亲喂"), FeedingKind::Direct);
        assert_eq!(FeedingKind::parse(" Formula "), FeedingKind::Formula);
        assert_eq!(FeedingKind::parse("母乳瓶喂"), FeedingKind::BottledBreastMilk);
        assert_eq!(
            FeedingKind::parse("Bottled Breast Milk"),
            FeedingKind::BottledBreastMilk
        );
    }

    #[test]
    fn blank_feeding_kind_gets_a_visible_label() {
        assert_eq!(FeedingKind::parse("  "), FeedingKind::Unspecified);
        assert_eq!(FeedingKind::parse("").label(), "unspecified");
    }

    #[test]
    fn unrecognized_feeding_kind_is_preserved() {
        let kind = FeedingKind::parse("辅食");
        assert_eq!(kind, FeedingKind::Other("辅食".into()));
        assert_eq!(kind.label(), "辅食");
        assert_eq!(serde_json::to_value(&kind).unwrap(), "辅食");
    }

    #[test]
    fn observed_span_spans_both_collections() {
        let ds = Dataset {
            sleep: vec![SleepRecord {
                date: d("2024-03-05"),
                sleep_start: None,
                sleep_end: None,
                duration_minutes: None,
            }],
            feeding: vec![FeedingRecord {
                date: d("2024-03-10"),
                feeding_type: FeedingKind::Formula,
                feeding_time: None,
                volume_ml: Some(90.0),
            }],
        };
        assert_eq!(ds.observed_span(), Some((d("2024-03-05"), d("2024-03-10"))));
        assert_eq!(Dataset::default().observed_span(), None);
    }
}
