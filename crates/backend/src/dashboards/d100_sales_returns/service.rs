use contracts::dashboards::d100_sales_returns::{
    DashboardFilters, FilterOptionsResponse, SalesDashboardResponse, SalesKpis, TimeseriesPoint,
    TopReturnsRow, TopRevenueRow,
};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::filter::apply_filters;
use super::model::{OrderRecord, SalesTable};

/// Leaderboard length
pub const TOP_N: usize = 10;

/// Filter the table and compute every dashboard block in one pass over the subset
pub fn aggregate(table: &SalesTable, filters: &DashboardFilters) -> SalesDashboardResponse {
    let rows = apply_filters(table, filters);

    SalesDashboardResponse {
        kpis: compute_kpis(&rows),
        timeseries: daily_timeseries(&rows),
        top_by_revenue: top_by_revenue(&rows, TOP_N),
        top_by_returns: top_by_returns(&rows, TOP_N),
        synthetic_dates: table.synthetic_dates,
    }
}

/// `numerator / denominator`, 0 for an empty denominator
fn ratio(numerator: f64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator / denominator as f64
    }
}

pub fn compute_kpis(rows: &[&OrderRecord]) -> SalesKpis {
    let total_revenue: f64 = rows.iter().map(|r| r.total).sum();
    let order_count = rows.len() as u64;
    let returns_count: u64 = rows.iter().map(|r| u64::from(r.returned)).sum();

    SalesKpis {
        total_revenue,
        order_count,
        average_order_value: ratio(total_revenue, order_count),
        returns_count,
        returns_rate: ratio(returns_count as f64, order_count),
    }
}

/// Revenue and order count per calendar day. Days without orders are omitted.
pub fn daily_timeseries(rows: &[&OrderRecord]) -> Vec<TimeseriesPoint> {
    let mut by_day: BTreeMap<chrono::NaiveDate, (f64, u64)> = BTreeMap::new();
    for r in rows {
        let entry = by_day.entry(r.date).or_insert((0.0, 0));
        entry.0 += r.total;
        entry.1 += 1;
    }

    by_day
        .into_iter()
        .map(|(date, (revenue, orders))| TimeseriesPoint {
            date,
            revenue,
            orders,
        })
        .collect()
}

/// Per-product totals, in first-seen order
struct ProductStats<'a> {
    product: &'a str,
    revenue: f64,
    units_sold: f64,
    returns: u64,
    orders: u64,
}

fn group_by_product<'a>(rows: &[&'a OrderRecord]) -> Vec<ProductStats<'a>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<ProductStats<'a>> = Vec::new();

    for &r in rows {
        let i = *index.entry(r.product.as_str()).or_insert_with(|| {
            groups.push(ProductStats {
                product: r.product.as_str(),
                revenue: 0.0,
                units_sold: 0.0,
                returns: 0,
                orders: 0,
            });
            groups.len() - 1
        });
        let g = &mut groups[i];
        g.revenue += r.total;
        g.units_sold += r.quantity;
        g.returns += u64::from(r.returned);
        g.orders += 1;
    }

    groups
}

/// Descending comparison; `sort_by` is stable so equal keys keep first-seen order
fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

pub fn top_by_revenue(rows: &[&OrderRecord], limit: usize) -> Vec<TopRevenueRow> {
    let mut groups = group_by_product(rows);
    groups.sort_by(|a, b| descending(a.revenue, b.revenue));

    groups
        .into_iter()
        .take(limit)
        .map(|g| TopRevenueRow {
            product: g.product.to_string(),
            revenue: g.revenue,
            units_sold: g.units_sold,
            returns: g.returns,
        })
        .collect()
}

pub fn top_by_returns(rows: &[&OrderRecord], limit: usize) -> Vec<TopReturnsRow> {
    let mut groups = group_by_product(rows);
    groups.sort_by(|a, b| b.returns.cmp(&a.returns));

    groups
        .into_iter()
        .take(limit)
        .map(|g| TopReturnsRow {
            product: g.product.to_string(),
            returns: g.returns,
            orders: g.orders,
            return_rate: ratio(g.returns as f64, g.orders),
        })
        .collect()
}

/// Domains for the sidebar widgets, computed over the whole (unfiltered) table
pub fn filter_options(table: &SalesTable) -> FilterOptionsResponse {
    let products: BTreeSet<&str> = table.records.iter().map(|r| r.product.as_str()).collect();
    let categories: BTreeSet<&str> = if table.has_category {
        table
            .records
            .iter()
            .filter_map(|r| r.category.as_deref())
            .filter(|c| !c.is_empty())
            .collect()
    } else {
        BTreeSet::new()
    };

    FilterOptionsResponse {
        min_date: table.records.iter().map(|r| r.date).min(),
        max_date: table.records.iter().map(|r| r.date).max(),
        products: products.into_iter().map(str::to_string).collect(),
        categories: categories.into_iter().map(str::to_string).collect(),
        synthetic_dates: table.synthetic_dates,
        row_count: table.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use contracts::dashboards::d100_sales_returns::DateRange;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, d).unwrap()
    }

    fn rec(date: u32, product: &str, qty: f64, price: f64, returned: u8) -> OrderRecord {
        OrderRecord {
            order_id: format!("{}{}", product, date),
            date: day(date),
            product: product.to_string(),
            category: Some(if product < "M" { "Low" } else { "High" }.to_string()),
            quantity: qty,
            unit_price: Some(price),
            total: qty * price,
            returned,
        }
    }

    /// The A/A/B scenario from the dashboard's acceptance notes
    fn scenario() -> SalesTable {
        SalesTable::new(
            vec![
                rec(1, "A", 2.0, 10.0, 0),
                rec(1, "A", 1.0, 10.0, 1),
                rec(3, "B", 5.0, 2.0, 0),
            ],
            true,
        )
    }

    #[test]
    fn test_scenario_kpis() {
        let result = aggregate(&scenario(), &DashboardFilters::default());
        let k = &result.kpis;
        assert_eq!(k.total_revenue, 40.0);
        assert_eq!(k.order_count, 3);
        assert!((k.average_order_value - 40.0 / 3.0).abs() < 1e-9);
        assert_eq!(k.returns_count, 1);
        assert!((k.returns_rate - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_scenario_tables() {
        let result = aggregate(&scenario(), &DashboardFilters::default());

        assert_eq!(
            result.timeseries,
            vec![
                TimeseriesPoint {
                    date: day(1),
                    revenue: 30.0,
                    orders: 2
                },
                TimeseriesPoint {
                    date: day(3),
                    revenue: 10.0,
                    orders: 1
                },
            ]
        );

        assert_eq!(result.top_by_revenue.len(), 2);
        assert_eq!(result.top_by_revenue[0].product, "A");
        assert_eq!(result.top_by_revenue[0].revenue, 30.0);
        assert_eq!(result.top_by_revenue[0].units_sold, 3.0);
        assert_eq!(result.top_by_revenue[0].returns, 1);
        assert_eq!(result.top_by_revenue[1].product, "B");

        let top = &result.top_by_returns[0];
        assert_eq!(top.product, "A");
        assert_eq!(top.returns, 1);
        assert_eq!(top.orders, 2);
        assert_eq!(top.return_rate, 0.5);
        assert_eq!(result.top_by_returns[1].return_rate, 0.0);
    }

    #[test]
    fn test_date_range_excluding_everything_degrades_to_zero() {
        let filters = DashboardFilters {
            date_range: Some(DateRange::new(day(20), day(25))),
            ..Default::default()
        };
        let result = aggregate(&scenario(), &filters);
        assert_eq!(result.kpis, SalesKpis::default());
        assert!(result.timeseries.is_empty());
        assert!(result.top_by_revenue.is_empty());
        assert!(result.top_by_returns.is_empty());
    }

    #[test]
    fn test_absent_product_degrades_to_zero() {
        let filters = DashboardFilters {
            products: vec!["Nope".into()],
            ..Default::default()
        };
        let result = aggregate(&scenario(), &filters);
        assert_eq!(result.kpis.order_count, 0);
        assert_eq!(result.kpis.average_order_value, 0.0);
        assert_eq!(result.kpis.returns_rate, 0.0);
        assert!(result.top_by_returns.is_empty());
    }

    #[test]
    fn test_leaderboards_truncate_and_sort() {
        // 12 products, product P{i} earns i * 10
        let records: Vec<OrderRecord> = (1..=12)
            .map(|i| rec(1 + (i % 5) as u32, &format!("P{:02}", i), i as f64, 10.0, (i % 2) as u8))
            .collect();
        let table = SalesTable::new(records, false);
        let result = aggregate(&table, &DashboardFilters::default());

        assert_eq!(result.top_by_revenue.len(), TOP_N);
        assert_eq!(result.top_by_revenue[0].product, "P12");
        for pair in result.top_by_revenue.windows(2) {
            assert!(pair[0].revenue >= pair[1].revenue);
        }

        assert_eq!(result.top_by_returns.len(), TOP_N);
        for pair in result.top_by_returns.windows(2) {
            assert!(pair[0].returns >= pair[1].returns);
        }
        assert!(result.timeseries.iter().all(|p| p.orders > 0));
        for pair in result.timeseries.windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let table = SalesTable::new(
            vec![
                rec(1, "Zeta", 1.0, 5.0, 1),
                rec(1, "Alpha", 1.0, 5.0, 1),
                rec(2, "Mid", 1.0, 9.0, 0),
                rec(2, "Beta", 1.0, 5.0, 1),
            ],
            false,
        );
        let rows: Vec<&OrderRecord> = table.records.iter().collect();

        let by_revenue: Vec<String> = top_by_revenue(&rows, TOP_N)
            .into_iter()
            .map(|r| r.product)
            .collect();
        assert_eq!(by_revenue, vec!["Mid", "Zeta", "Alpha", "Beta"]);

        let by_returns: Vec<String> = top_by_returns(&rows, TOP_N)
            .into_iter()
            .map(|r| r.product)
            .collect();
        assert_eq!(by_returns, vec!["Zeta", "Alpha", "Beta", "Mid"]);
    }

    #[test]
    fn test_kpi_invariants_hold_for_every_filter() {
        let table = scenario();
        let filter_sets = vec![
            DashboardFilters::default(),
            DashboardFilters {
                products: vec!["A".into()],
                ..Default::default()
            },
            DashboardFilters {
                categories: vec!["Low".into()],
                date_range: Some(DateRange::new(day(2), day(3))),
                ..Default::default()
            },
        ];

        for filters in filter_sets {
            let expected = apply_filters(&table, &filters).len() as u64;
            let k = aggregate(&table, &filters).kpis;
            assert_eq!(k.order_count, expected);
            assert!((0.0..=1.0).contains(&k.returns_rate));
            if k.order_count > 0 {
                let rebuilt = k.average_order_value * k.order_count as f64;
                assert!((rebuilt - k.total_revenue).abs() < 1e-9);
            } else {
                assert_eq!(k.average_order_value, 0.0);
            }
        }
    }

    #[test]
    fn test_filter_options() {
        let options = filter_options(&scenario());
        assert_eq!(options.products, vec!["A", "B"]);
        assert_eq!(options.categories, vec!["Low"]);
        assert_eq!(options.min_date, Some(day(1)));
        assert_eq!(options.max_date, Some(day(3)));
        assert_eq!(options.row_count, 3);

        let mut no_category = scenario();
        no_category.has_category = false;
        assert!(filter_options(&no_category).categories.is_empty());

        let empty = filter_options(&SalesTable::default());
        assert_eq!(empty.min_date, None);
        assert!(empty.products.is_empty());
    }
}
