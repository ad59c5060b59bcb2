//! Schema introspection for the connected database
//!
//! All lookups go through `information_schema` and are scoped to
//! `DATABASE()`, the schema named in the connection URL.

use tracing::{debug, info};

use crate::error::Result;
use crate::query::Query;
use crate::traits::Pool;
use crate::FromRow;

/// One column as reported by `information_schema.COLUMNS`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ColumnInfo {
    #[migrun(rename = "COLUMN_NAME")]
    pub name: String,
    /// Full column type, e.g. `varchar(255)` or `tinyint(1)`
    #[migrun(rename = "COLUMN_TYPE")]
    pub data_type: String,
    #[migrun(rename = "IS_NULLABLE")]
    pub nullable: bool,
    #[migrun(rename = "IS_PRIMARY_KEY")]
    pub primary_key: bool,
}

pub async fn table_exists<P: Pool>(pool: &P, table: &str) -> Result<bool> {
    let count: i64 = Query::new(
        "SELECT COUNT(*) FROM information_schema.TABLES \
         WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?",
    )
    .bind(table)
    .fetch_scalar(pool)
    .await?;
    Ok(count > 0)
}

pub async fn column_exists<P: Pool>(pool: &P, table: &str, column: &str) -> Result<bool> {
    let count: i64 = Query::new(
        "SELECT COUNT(*) FROM information_schema.COLUMNS \
         WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND COLUMN_NAME = ?",
    )
    .bind(table)
    .bind(column)
    .fetch_scalar(pool)
    .await?;
    Ok(count > 0)
}

/// Add `column` to `table` unless it is already there.
///
/// `definition` is the column type and options, e.g.
/// `TEXT NOT NULL DEFAULT ('')`. Returns whether the column was added.
pub async fn add_column_if_missing<P: Pool>(
    pool: &P,
    table: &str,
    column: &str,
    definition: &str,
) -> Result<bool> {
    if column_exists(pool, table, column).await? {
        debug!(table, column, "column already present");
        return Ok(false);
    }
    pool.execute_script(&format!(
        "ALTER TABLE `{}` ADD COLUMN `{}` {}",
        table, column, definition
    ))
    .await?;
    info!(table, column, "added column");
    Ok(true)
}

#[derive(FromRow)]
struct TableName {
    #[migrun(rename = "TABLE_NAME")]
    name: String,
}

/// Base tables of the current database, sorted by name.
pub async fn list_tables<P: Pool>(pool: &P) -> Result<Vec<String>> {
    let rows: Vec<TableName> = Query::new(
        "SELECT TABLE_NAME FROM information_schema.TABLES \
         WHERE TABLE_SCHEMA = DATABASE() AND TABLE_TYPE = 'BASE TABLE' \
         ORDER BY TABLE_NAME",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|t| t.name).collect())
}

/// Columns of `table` in declaration order.
pub async fn list_columns<P: Pool>(pool: &P, table: &str) -> Result<Vec<ColumnInfo>> {
    Query::new(
        "SELECT COLUMN_NAME, COLUMN_TYPE, IS_NULLABLE, \
                (COLUMN_KEY = 'PRI') AS IS_PRIMARY_KEY \
         FROM information_schema.COLUMNS \
         WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? \
         ORDER BY ORDINAL_POSITION",
    )
    .bind(table)
    .fetch_all(pool)
    .await
}
