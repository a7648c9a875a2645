use contracts::dashboards::d100_sales_returns::DashboardFilters;
use std::collections::HashSet;

use super::model::{OrderRecord, SalesTable};

/// Records passing the date range AND product AND category filters, in table order.
///
/// An empty product/category list does not restrict. The category filter is
/// ignored when the table has no category column.
pub fn apply_filters<'a>(table: &'a SalesTable, filters: &DashboardFilters) -> Vec<&'a OrderRecord> {
    let products: HashSet<&str> = filters.products.iter().map(String::as_str).collect();
    let categories: HashSet<&str> = if table.has_category {
        filters.categories.iter().map(String::as_str).collect()
    } else {
        HashSet::new()
    };

    table
        .records
        .iter()
        .filter(|r| filters.date_range.map_or(true, |range| range.contains(r.date)))
        .filter(|r| products.is_empty() || products.contains(r.product.as_str()))
        .filter(|r| {
            categories.is_empty()
                || r
                    .category
                    .as_deref()
                    .map_or(false, |c| categories.contains(c))
        })
        .collect()
}
