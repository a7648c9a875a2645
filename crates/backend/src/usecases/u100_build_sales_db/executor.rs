use anyhow::{Context, Result};
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement, TransactionTrait};
use std::path::Path;

use crate::dashboards::d100_sales_returns::csv_source::{read_sales_csv, CsvOptions};
use crate::dashboards::d100_sales_returns::model::SalesTable;
use crate::dashboards::d100_sales_returns::repository::SALES_TABLE;
use crate::shared::config::DataConfig;
use crate::shared::data::db::{self, OpenMode};

/// Outcome of one build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub rows_written: usize,
    pub rows_dropped: usize,
}

/// Clean the CSV and write it to the SQLite `sales` table
pub async fn execute(config: &DataConfig) -> Result<BuildSummary> {
    tracing::info!(
        "Building {} from {}",
        config.database_path.display(),
        config.csv_path.display()
    );

    let file = std::fs::File::open(&config.csv_path)
        .with_context(|| format!("Cannot open {}", config.csv_path.display()))?;
    let today = chrono::Local::now().date_naive();
    let report = read_sales_csv(
        file,
        today,
        CsvOptions {
            drop_incomplete_rows: true,
        },
    )?;

    if report.table.synthetic_dates {
        tracing::warn!("CSV has no date column: writing placeholder dates ending today");
    }

    write_sales_table(&config.database_path, &report.table).await?;

    let summary = BuildSummary {
        rows_written: report.table.len(),
        rows_dropped: report.dropped_rows,
    };
    tracing::info!(
        "Sales table built: {} rows written, {} incomplete rows dropped",
        summary.rows_written,
        summary.rows_dropped
    );
    Ok(summary)
}

/// Replace the `sales` table with `table` in a single transaction
pub async fn write_sales_table(db_file: &Path, table: &SalesTable) -> Result<()> {
    let conn = db::connect(db_file, OpenMode::ReadWriteCreate).await?;
    let txn = conn.begin().await?;

    txn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        format!("DROP TABLE IF EXISTS {}", SALES_TABLE),
    ))
    .await?;

    // Category column only exists when the source had one
    let category_column = if table.has_category {
        "Category TEXT,"
    } else {
        ""
    };
    txn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        format!(
            r#"
            CREATE TABLE {} (
                OrderID TEXT NOT NULL,
                date TEXT NOT NULL,
                product TEXT NOT NULL,
                {}
                Quantity REAL NOT NULL,
                UnitPrice REAL,
                Total REAL NOT NULL,
                returned INTEGER NOT NULL DEFAULT 0
            )
            "#,
            SALES_TABLE, category_column
        ),
    ))
    .await?;

    let insert_sql = if table.has_category {
        format!(
            "INSERT INTO {} (OrderID, date, product, Category, Quantity, UnitPrice, Total, returned) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            SALES_TABLE
        )
    } else {
        format!(
            "INSERT INTO {} (OrderID, date, product, Quantity, UnitPrice, Total, returned) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            SALES_TABLE
        )
    };

    for (idx, r) in table.records.iter().enumerate() {
        if idx > 0 && idx % 1000 == 0 {
            tracing::info!("Sales table progress: {} rows written...", idx);
        }

        let mut values: Vec<sea_orm::Value> = vec![
            r.order_id.clone().into(),
            r.date.format("%Y-%m-%d").to_string().into(),
            r.product.clone().into(),
        ];
        if table.has_category {
            values.push(r.category.clone().into());
        }
        values.extend([
            r.quantity.into(),
            r.unit_price.into(),
            r.total.into(),
            i32::from(r.returned).into(),
        ]);

        txn.execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            &insert_sql,
            values,
        ))
        .await?;
    }

    txn.commit().await?;
    Ok(())
}
