use async_trait::async_trait;
use chrono::NaiveDate;
use std::io::Read;
use std::path::PathBuf;

use super::error::LoadError;
use super::model::{OrderRecord, SalesTable};
use super::normalize::{
    parse_date, parse_non_negative, parse_number, parse_returned, synthesize_dates,
};
use super::source::SalesSource;

/// Flat-file fallback source (`data/sample_sales.csv` by default)
pub struct CsvSalesSource {
    path: PathBuf,
}

impl CsvSalesSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SalesSource for CsvSalesSource {
    fn name(&self) -> &str {
        "csv"
    }

    async fn load(&self) -> Result<SalesTable, LoadError> {
        if !self.path.exists() {
            return Err(LoadError::unavailable(
                self.name(),
                format!("{} not found", self.path.display()),
            ));
        }

        // File IO and parsing stay off the async workers
        let path = self.path.clone();
        let report = tokio::task::spawn_blocking(move || -> Result<CsvReport, LoadError> {
            let file = std::fs::File::open(&path)?;
            let today = chrono::Local::now().date_naive();
            read_sales_csv(file, today, CsvOptions::default())
        })
        .await
        .map_err(|e| LoadError::unavailable(self.name(), e))??;

        tracing::info!(
            "Loaded {} rows from {} (synthetic dates: {})",
            report.table.len(),
            self.path.display(),
            report.table.synthetic_dates
        );

        Ok(report.table)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvOptions {
    /// Drop rows with an empty cell in any column instead of parsing them
    pub drop_incomplete_rows: bool,
}

#[derive(Debug)]
pub struct CsvReport {
    pub table: SalesTable,
    pub dropped_rows: usize,
}

/// Column positions resolved from the (trimmed) header row
struct Columns {
    order_id: Option<usize>,
    date: Option<usize>,
    product: usize,
    category: Option<usize>,
    quantity: usize,
    unit_price: Option<usize>,
    total: Option<usize>,
    returned: Option<usize>,
}

impl Columns {
    fn resolve(headers: &[String]) -> Result<Self, LoadError> {
        // Case-insensitive lookup by header name
        let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        let require =
            |name: &str| find(name).ok_or_else(|| LoadError::MissingColumn(name.to_string()));

        let columns = Self {
            order_id: find("OrderID"),
            date: find("date"),
            product: require("product")?,
            category: find("Category"),
            quantity: require("Quantity")?,
            unit_price: find("UnitPrice"),
            total: find("Total"),
            returned: find("returned"),
        };

        if columns.date.is_none() && columns.order_id.is_none() {
            return Err(LoadError::MissingColumn("date".to_string()));
        }
        if columns.total.is_none() && columns.unit_price.is_none() {
            return Err(LoadError::MissingColumn("Total".to_string()));
        }

        Ok(columns)
    }
}

/// Read and normalize order records from CSV text.
///
/// `today` anchors the synthetic date sequence when the file has no `date`
/// column.
pub fn read_sales_csv<R: Read>(
    reader: R,
    today: NaiveDate,
    options: CsvOptions,
) -> Result<CsvReport, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{FEFF}').trim().to_string())
        .collect();

    tracing::debug!("Sales CSV headers: {:?}", headers);

    let columns = Columns::resolve(&headers)?;

    let mut rows = Vec::new();
    let mut dropped_rows = 0usize;
    for result in reader.records() {
        let record = result?;
        if options.drop_incomplete_rows && record.iter().any(|v| v.trim().is_empty()) {
            dropped_rows += 1;
            continue;
        }
        rows.push(record);
    }

    let synthetic = if columns.date.is_none() {
        Some(synthesize_dates(rows.len(), today))
    } else {
        None
    };

    let mut records = Vec::with_capacity(rows.len());
    for (i, record) in rows.iter().enumerate() {
        let row = i + 1;
        let field = move |idx: usize| record.get(idx).unwrap_or("").trim();
        let optional = move |idx: Option<usize>| idx.map(field).filter(|v| !v.is_empty());

        let date = match (&synthetic, columns.date) {
            (Some(dates), _) => dates[i],
            (None, Some(idx)) => parse_date(row, field(idx))?,
            (None, None) => return Err(LoadError::MissingColumn("date".to_string())),
        };

        let quantity = parse_non_negative(row, "Quantity", field(columns.quantity))?;
        let unit_price = optional(columns.unit_price)
            .map(|v| parse_non_negative(row, "UnitPrice", v))
            .transpose()?;

        let total = match columns.total {
            Some(idx) => parse_number(row, "Total", field(idx))?,
            None => {
                // Derived total: a missing price is an error, not a zero
                let price = match unit_price {
                    Some(p) => p,
                    None => parse_number(row, "UnitPrice", "")?,
                };
                quantity * price
            }
        };

        let returned = match columns.returned {
            Some(idx) => parse_returned(row, field(idx))?,
            None => 0,
        };

        records.push(OrderRecord {
            order_id: optional(columns.order_id).unwrap_or_default().to_string(),
            date,
            product: field(columns.product).to_string(),
            category: optional(columns.category).map(str::to_string),
            quantity,
            unit_price,
            total,
            returned,
        });
    }

    let mut table = SalesTable::new(records, columns.category.is_some());
    table.synthetic_dates = synthetic.is_some();

    Ok(CsvReport {
        table,
        dropped_rows,
    })
}
