use sea_orm::{
    ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, FromQueryResult,
    Statement,
};
use std::path::Path;

/// How the SQLite file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Readers never take a write lock or create the file
    ReadOnly,
    /// Create the file (and parent directory) if needed
    ReadWriteCreate,
}

impl OpenMode {
    fn as_query(&self) -> &'static str {
        match self {
            OpenMode::ReadOnly => "ro",
            OpenMode::ReadWriteCreate => "rwc",
        }
    }
}

/// Build a `sqlite://` URL for a file path
pub fn sqlite_url(db_file: &Path, mode: OpenMode) -> String {
    let absolute_path = if db_file.is_absolute() {
        db_file.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|dir| dir.join(db_file))
            .unwrap_or_else(|_| db_file.to_path_buf())
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    format!("sqlite://{}{}?mode={}", prefix, normalized, mode.as_query())
}

/// Open a connection to a SQLite file
pub async fn connect(db_file: &Path, mode: OpenMode) -> Result<DatabaseConnection, DbErr> {
    if mode == OpenMode::ReadWriteCreate {
        if let Some(parent) = db_file.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| DbErr::Custom(e.to_string()))?;
        }
    }
    Database::connect(sqlite_url(db_file, mode)).await
}

#[derive(Debug, FromQueryResult)]
struct TableColumn {
    name: String,
}

/// Column names of a table, in declaration order. Empty if the table does not exist.
pub async fn table_columns<C: ConnectionTrait>(db: &C, table: &str) -> Result<Vec<String>, DbErr> {
    // PRAGMA arguments cannot be bound, so only plain identifiers are accepted
    if !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(DbErr::Custom(format!("invalid table name: {}", table)));
    }
    let stmt = Statement::from_string(
        DatabaseBackend::Sqlite,
        format!("PRAGMA table_info({})", table),
    );
    let columns = TableColumn::find_by_statement(stmt).all(db).await?;
    Ok(columns.into_iter().map(|c| c.name).collect())
}
