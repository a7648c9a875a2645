use thiserror::Error;

/// Shown to the user when neither source yields any rows
pub const NO_DATA_MESSAGE: &str =
    "No data found. Provide data/sample_sales.csv or run `backend build-db` to create data/retail.db.";

/// Ошибки загрузки набора данных
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{source_name} source unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    #[error("{}", NO_DATA_MESSAGE)]
    NoData,

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Row {row}: column {column} has non-numeric value {value:?}")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Row {row}: cannot parse date {value:?}")]
    InvalidDate { row: usize, value: String },

    #[error("Row {row}: returned flag must be 0 or 1, got {value:?}")]
    InvalidReturnedFlag { row: usize, value: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl LoadError {
    pub fn unavailable(source_name: &str, reason: impl ToString) -> Self {
        Self::SourceUnavailable {
            source_name: source_name.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether the loader may fall through to the next source
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. } | Self::Database(_))
    }
}
