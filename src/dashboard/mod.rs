//! Month reports for the dashboard.
//!
//! This module contains:
//! - Summary statistics (total sale amount, sold and unsold counts)
//! - The price-range histogram
//! - The category breakdown
//! - Route handlers for each report and for all three combined

mod categories;
mod config;
mod handlers;
mod price_ranges;
mod statistics;

pub use config::{DEFAULT_PRICE_BOUNDARIES, DEFAULT_REFERENCE_YEAR, PriceRanges, ReportConfig};
pub use handlers::{
    get_category_chart, get_combined_report, get_price_range_chart, get_statistics_endpoint,
};
