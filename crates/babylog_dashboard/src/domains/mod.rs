//! Pipeline stages between raw tables and chart payloads.
//!
//! # Modules
//!
//! - [`clock`]: Time-of-day parsing and formatting
//! - [`normalize`]: Raw table to typed record coercion
//! - [`window`]: Date-range selection and filtering
//! - [`timeline`]: Per-day sleep segments and feeding markers
//! - [`daily`]: Per-date sleep and milk totals

pub mod clock;
pub mod daily;
pub mod normalize;
pub mod timeline;
pub mod window;

pub use daily::{DailyTotals, aggregate_daily};
pub use normalize::normalize_tables;
pub use timeline::{Timeline, build_timeline};
pub use window::{DateWindow, WindowSelector, filter_dataset, resolve_window};
