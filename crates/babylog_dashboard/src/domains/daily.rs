//! Per-date sleep and milk totals.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::types::Dataset;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DailySleep {
    pub date: NaiveDate,
    pub minutes: f64,
    pub hours: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DailyMilk {
    pub date: NaiveDate,
    pub volume_ml: f64,
}

/// Per-date totals. Dates without any record are absent, not zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DailyTotals {
    pub sleep: Vec<DailySleep>,
    pub milk: Vec<DailyMilk>,
}

/// Group by date and sum, treating unknown amounts as zero.
pub fn aggregate_daily(dataset: &Dataset) -> DailyTotals {
    let sleep = group_sum(
        dataset
            .sleep
            .iter()
            .map(|r| (r.date, r.duration_minutes.unwrap_or(0.0))),
    );
    let milk = group_sum(
        dataset
            .feeding
            .iter()
            .map(|r| (r.date, r.volume_ml.unwrap_or(0.0))),
    );

    DailyTotals {
        sleep: sleep
            .into_iter()
            .map(|(date, minutes)| DailySleep {
                date,
                minutes,
                hours: minutes / 60.0,
            })
            .collect(),
        milk: milk
            .into_iter()
            .map(|(date, volume_ml)| DailyMilk { date, volume_ml })
            .collect(),
    }
}

// Values are summed in ascending order so the total does not depend on row order.
fn group_sum(values: impl Iterator<Item = (NaiveDate, f64)>) -> BTreeMap<NaiveDate, f64> {
    let mut grouped: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for (date, v) in values {
        grouped.entry(date).or_default().push(v);
    }
    grouped
        .into_iter()
        .map(|(date, mut vs)| {
            vs.sort_by(f64::total_cmp);
            (date, vs.iter().sum())
        })
        .collect()
}
