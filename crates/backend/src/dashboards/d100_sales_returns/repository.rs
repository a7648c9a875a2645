use async_trait::async_trait;
use sea_orm::{FromQueryResult, Statement};
use std::path::PathBuf;

use super::error::LoadError;
use super::model::{OrderRecord, SalesTable};
use super::normalize::{non_negative, parse_date};
use super::source::SalesSource;
use crate::shared::data::db::{self, OpenMode};

pub const SALES_TABLE: &str = "sales";

const REQUIRED_COLUMNS: [&str; 5] = ["OrderID", "date", "product", "Quantity", "Total"];

/// Raw row of the `sales` table
#[derive(Debug, Clone, FromQueryResult)]
struct SalesRow {
    order_id: Option<String>,
    date: Option<String>,
    product: Option<String>,
    category: Option<String>,
    quantity: Option<f64>,
    unit_price: Option<f64>,
    total: Option<f64>,
    returned: Option<i64>,
}

/// Primary source: the `sales` table of the SQLite export (`data/retail.db`).
///
/// The table is expected to be normalized already. Any problem with it is
/// reported as `SourceUnavailable` so the loader can fall back.
pub struct SqliteSalesSource {
    path: PathBuf,
}

impl SqliteSalesSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_table(&self) -> Result<SalesTable, LoadError> {
        let conn = db::connect(&self.path, OpenMode::ReadOnly).await?;

        let columns = db::table_columns(&conn, SALES_TABLE).await?;
        if columns.is_empty() {
            return Err(LoadError::unavailable(
                self.name(),
                format!("table `{}` not found", SALES_TABLE),
            ));
        }
        // SQLite column names are case-insensitive
        let has = |name: &str| columns.iter().any(|c| c.eq_ignore_ascii_case(name));
        if let Some(missing) = REQUIRED_COLUMNS.iter().find(|&&c| !has(c)) {
            return Err(LoadError::unavailable(
                self.name(),
                format!("table `{}` has no column {}", SALES_TABLE, missing),
            ));
        }
        let has_category = has("Category");

        let sql = format!(
            r#"
            SELECT
                CAST(OrderID AS TEXT)  AS order_id,
                CAST(date AS TEXT)     AS date,
                CAST(product AS TEXT)  AS product,
                {category}             AS category,
                CAST(Quantity AS REAL) AS quantity,
                {unit_price}           AS unit_price,
                CAST(Total AS REAL)    AS total,
                {returned}             AS returned
            FROM {table}
            "#,
            category = if has_category {
                "CAST(Category AS TEXT)"
            } else {
                "NULL"
            },
            unit_price = if has("UnitPrice") {
                "CAST(UnitPrice AS REAL)"
            } else {
                "NULL"
            },
            returned = if has("returned") {
                "CAST(COALESCE(returned, 0) AS INTEGER)"
            } else {
                "0"
            },
            table = SALES_TABLE,
        );

        let stmt = Statement::from_string(sea_orm::DatabaseBackend::Sqlite, sql);
        let rows = SalesRow::find_by_statement(stmt).all(&conn).await?;

        let records = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| to_record(i + 1, row))
            .collect::<Result<Vec<_>, _>>()
            // A bad row means the export itself is malformed
            .map_err(|e| LoadError::unavailable(self.name(), e))?;

        Ok(SalesTable::new(records, has_category))
    }
}

#[async_trait]
impl SalesSource for SqliteSalesSource {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn load(&self) -> Result<SalesTable, LoadError> {
        if !self.path.exists() {
            return Err(LoadError::unavailable(
                self.name(),
                format!("{} not found", self.path.display()),
            ));
        }

        let table = self.read_table().await?;
        tracing::info!(
            "Loaded {} rows from {} table `{}`",
            table.len(),
            self.path.display(),
            SALES_TABLE
        );
        Ok(table)
    }
}

fn to_record(row: usize, r: SalesRow) -> Result<OrderRecord, LoadError> {
    let null = |column: &str| LoadError::InvalidNumber {
        row,
        column: column.to_string(),
        value: "NULL".to_string(),
    };

    let date = parse_date(row, r.date.as_deref().unwrap_or(""))?;
    let quantity = r.quantity.ok_or_else(|| null("Quantity"))?;
    let returned = match r.returned.unwrap_or(0) {
        0 => 0,
        1 => 1,
        other => {
            return Err(LoadError::InvalidReturnedFlag {
                row,
                value: other.to_string(),
            })
        }
    };

    Ok(OrderRecord {
        order_id: r.order_id.unwrap_or_default(),
        date,
        product: r.product.unwrap_or_default(),
        category: r.category.filter(|c| !c.is_empty()),
        quantity: non_negative(row, "Quantity", quantity)?,
        unit_price: r
            .unit_price
            .map(|p| non_negative(row, "UnitPrice", p))
            .transpose()?,
        total: r.total.ok_or_else(|| null("Total"))?,
        returned,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use sea_orm::ConnectionTrait;
    use std::path::Path;

    /// Unique scratch path under the system temp dir
    pub(crate) fn temp_db_path(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "sales-returns-{}-{}.db",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        path
    }

    async fn exec(path: &Path, sql: &str) {
        let conn = db::connect(path, OpenMode::ReadWriteCreate).await.unwrap();
        conn.execute(Statement::from_string(
            sea_orm::DatabaseBackend::Sqlite,
            sql.to_string(),
        ))
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let source = SqliteSalesSource::new(temp_db_path("missing"));
        let err = source.load().await.unwrap_err();
        assert!(matches!(err, LoadError::SourceUnavailable { .. }));
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn test_missing_table_is_unavailable() {
        let path = temp_db_path("no-table");
        exec(&path, "CREATE TABLE other (id INTEGER)").await;

        let err = SqliteSalesSource::new(&path).load().await.unwrap_err();
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("not found"));
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_reads_sales_table_without_optional_columns() {
        let path = temp_db_path("minimal");
        exec(
            &path,
            "CREATE TABLE sales (OrderID INTEGER, date TEXT, product TEXT, Quantity INTEGER, Total REAL)",
        )
        .await;
        exec(
            &path,
            "INSERT INTO sales VALUES (1, '2025-01-05', 'A', 2, 20.0), (2, '2025-01-06 10:00:00', 'B', 1, 4.5)",
        )
        .await;

        let table = SqliteSalesSource::new(&path).load().await.unwrap();
        assert_eq!(table.len(), 2);
        assert!(!table.has_category);
        assert!(!table.synthetic_dates);
        assert_eq!(table.records[0].order_id, "1");
        assert_eq!(table.records[0].quantity, 2.0);
        assert_eq!(table.records[1].total, 4.5);
        assert_eq!(table.records[1].returned, 0);
        assert_eq!(table.records[1].unit_price, None);
        assert_eq!(
            table.records[1].date,
            chrono::NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
        );
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_negative_quantity_is_malformed_table() {
        let path = temp_db_path("negative-qty");
        exec(
            &path,
            "CREATE TABLE sales (OrderID TEXT, date TEXT, product TEXT, Quantity REAL, Total REAL)",
        )
        .await;
        exec(&path, "INSERT INTO sales VALUES ('1', '2025-01-05', 'A', -3, -6)").await;

        let err = SqliteSalesSource::new(&path).load().await.unwrap_err();
        assert!(matches!(err, LoadError::SourceUnavailable { .. }));
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_bad_returned_flag_is_malformed_table() {
        let path = temp_db_path("bad-flag");
        exec(
            &path,
            "CREATE TABLE sales (OrderID TEXT, date TEXT, product TEXT, Quantity REAL, Total REAL, returned INTEGER)",
        )
        .await;
        exec(&path, "INSERT INTO sales VALUES ('1', '2025-01-05', 'A', 1, 1, 5)").await;

        let err = SqliteSalesSource::new(&path).load().await.unwrap_err();
        assert!(err.is_recoverable());
        let _ = std::fs::remove_file(&path);
    }
}
