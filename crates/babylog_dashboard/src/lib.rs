use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use babylog_client::{Config, DataSource, DataSourceError, TableName};

pub mod chart;
pub mod domains;
pub mod error;
pub mod http;
pub mod types;

pub use error::{DashboardError, DashboardResult};
pub use types::{Dataset, FeedingKind, FeedingRecord, SleepRecord};

use chart::Figure;
use domains::timeline::SkippedRecord;
use domains::{
    DailyTotals, DateWindow, WindowSelector, aggregate_daily, build_timeline, filter_dataset,
    normalize_tables, resolve_window,
};

/// Loads both tables from a [`DataSource`] and turns them into chart views.
#[derive(Clone)]
pub struct Dashboard {
    source: Arc<dyn DataSource>,
    fetch_timeout: Duration,
}

impl Dashboard {
    pub fn new(source: Arc<dyn DataSource>, fetch_timeout: Duration) -> Self {
        Self {
            source,
            fetch_timeout,
        }
    }

    pub fn from_config(cfg: &Config) -> Result<Self, DataSourceError> {
        let source = babylog_client::build_source(cfg)?;
        Ok(Self::new(source, cfg.fetch_timeout))
    }

    pub fn describe_source(&self) -> String {
        self.source.describe()
    }

    /// Fetch and normalize both tables.
    ///
    /// Nothing is returned unless both tables load; a failure in either one
    /// leaves the caller with no data at all.
    pub async fn load(&self) -> DashboardResult<Dataset> {
        let result = self.load_inner().await;
        match &result {
            Ok(ds) => tracing::info!(
                source = %self.source.describe(),
                sleep_rows = ds.sleep.len(),
                feeding_rows = ds.feeding.len(),
                "dataset loaded"
            ),
            Err(e) => {
                metrics::counter!("babylog_load_failures_total", "kind" => e.kind()).increment(1);
                tracing::warn!(source = %self.source.describe(), error = %e, "dataset load failed");
            }
        }
        result
    }

    async fn load_inner(&self) -> DashboardResult<Dataset> {
        let sleep = self.fetch(TableName::Sleep).await?;
        let feeding = self.fetch(TableName::Feeding).await?;
        normalize_tables(&sleep, &feeding)
    }

    async fn fetch(&self, table: TableName) -> DashboardResult<babylog_client::RawTable> {
        match tokio::time::timeout(self.fetch_timeout, self.source.fetch_table(table)).await {
            Ok(Ok(raw)) => {
                tracing::debug!(%table, rows = raw.len(), "table fetched");
                Ok(raw)
            }
            Ok(Err(source)) => Err(DashboardError::Fetch { table, source }),
            Err(_) => Err(DashboardError::Fetch {
                table,
                source: DataSourceError::Timeout(self.fetch_timeout),
            }),
        }
    }
}

/// Headline numbers for the selected window.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ViewTotals {
    pub days: usize,
    pub sleep_hours: f64,
    pub milk_ml: f64,
}

/// Everything a renderer needs for one selection.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DashboardView {
    pub selector: WindowSelector,
    /// `None` when a named window was asked for and there is no data.
    pub window: Option<DateWindow>,
    pub timeline: Figure,
    pub daily: Figure,
    pub skipped: Vec<SkippedRecord>,
    pub daily_totals: DailyTotals,
    pub totals: ViewTotals,
}

/// Filter `dataset` to the selected window and build both charts.
pub fn view(dataset: &Dataset, selector: &WindowSelector) -> DashboardView {
    let window = resolve_window(selector, dataset.observed_span());
    let filtered = match &window {
        Some(w) => filter_dataset(dataset, w),
        None => Dataset::default(),
    };

    let timeline = build_timeline(&filtered);
    let daily = aggregate_daily(&filtered);
    let totals = view_totals(&filtered, &daily);
    tracing::debug!(
        range = selector.label(),
        sleep_rows = filtered.sleep.len(),
        feeding_rows = filtered.feeding.len(),
        skipped = timeline.skipped.len(),
        "view built"
    );

    DashboardView {
        selector: *selector,
        window,
        timeline: chart::timeline_figure(&timeline),
        daily: chart::daily_figure(&daily),
        skipped: timeline.skipped,
        daily_totals: daily,
        totals,
    }
}

fn view_totals(filtered: &Dataset, daily: &DailyTotals) -> ViewTotals {
    ViewTotals {
        days: filtered.dates().len(),
        sleep_hours: daily.sleep.iter().map(|d| d.hours).sum(),
        milk_ml: daily.milk.iter().map(|d| d.volume_ml).sum(),
    }
}

/// Install the global `tracing` subscriber.
///
/// The filter comes from `BABYLOG_LOG_LEVEL`, then `RUST_LOG`, then `info`.
/// Output goes to stderr so stdout stays free for command output.
pub fn init_logging() -> String {
    let log_env = std::env::var("BABYLOG_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&log_env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .try_init();
    log_env
}
