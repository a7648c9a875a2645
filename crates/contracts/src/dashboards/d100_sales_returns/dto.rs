use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Inclusive date range `[from, to]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date <= self.to
    }
}

/// Filters selected on the dashboard sidebar.
///
/// Every axis is optional: `None` / empty list means "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardFilters {
    #[serde(default)]
    pub date_range: Option<DateRange>,
    /// Allowed products / SKUs
    #[serde(default)]
    pub products: Vec<String>,
    /// Allowed categories (ignored when the dataset has no category column)
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Summary KPI block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesKpis {
    /// GMV
    pub total_revenue: f64,
    pub order_count: u64,
    /// AOV, 0 when there are no orders
    pub average_order_value: f64,
    pub returns_count: u64,
    /// Fraction of orders flagged as returned, 0 when there are no orders
    pub returns_rate: f64,
}

/// One day of the revenue/orders series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeseriesPoint {
    pub date: NaiveDate,
    pub revenue: f64,
    pub orders: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopRevenueRow {
    pub product: String,
    pub revenue: f64,
    pub units_sold: f64,
    pub returns: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopReturnsRow {
    pub product: String,
    pub returns: u64,
    pub orders: u64,
    pub return_rate: f64,
}

/// Response for the sales & returns dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesDashboardResponse {
    pub kpis: SalesKpis,
    /// Sparse daily series, ascending by date
    pub timeseries: Vec<TimeseriesPoint>,
    /// Top 10 products by revenue
    pub top_by_revenue: Vec<TopRevenueRow>,
    /// Top 10 products by returns
    pub top_by_returns: Vec<TopReturnsRow>,
    /// Dates were generated by the loader and are placeholders only
    pub synthetic_dates: bool,
}

/// Values the sidebar filter widgets are populated from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptionsResponse {
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    /// Distinct products, sorted
    pub products: Vec<String>,
    /// Distinct categories, sorted; empty when the dataset has no category column
    pub categories: Vec<String>,
    pub synthetic_dates: bool,
    pub row_count: usize,
}

/// Response for a forced dataset reload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReloadResponse {
    pub row_count: usize,
    pub synthetic_dates: bool,
}

/// Error body returned by the dashboard endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}
