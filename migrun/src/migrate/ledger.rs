//! The `management_migrations` ledger table

use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::Result;
use crate::query::Query;
use crate::repository::Repository;
use crate::sql;
use crate::traits::Pool;
use crate::{FromRow, Record};

use super::script::MigrationScript;

pub const LEDGER_TABLE: &str = "management_migrations";

const CREATE_LEDGER: &str = "CREATE TABLE IF NOT EXISTS `management_migrations` (\
    `id` INT PRIMARY KEY, \
    `name` VARCHAR(255) NOT NULL, \
    `scriptName` VARCHAR(255) NOT NULL, \
    `createdAt` DATETIME NOT NULL)";

/// One applied script. The ledger is append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, Record)]
#[migrun(table = "management_migrations")]
pub struct LedgerEntry {
    /// The script's sequence number
    #[migrun(key)]
    pub id: u32,
    /// File name without extension
    pub name: String,
    #[migrun(rename = "scriptName")]
    pub script_name: String,
    #[migrun(rename = "createdAt")]
    pub created_at: NaiveDateTime,
}

impl LedgerEntry {
    pub fn for_script(script: &MigrationScript, created_at: NaiveDateTime) -> Self {
        Self {
            id: script.sequence,
            name: script.name().to_string(),
            script_name: script.file_name.clone(),
            created_at,
        }
    }
}

#[derive(FromRow)]
struct AppliedName {
    #[migrun(rename = "scriptName")]
    script_name: String,
}

/// Create the ledger table if it does not exist yet.
pub async fn ensure_table<P: Pool>(pool: &P) -> Result<()> {
    pool.execute_script(CREATE_LEDGER).await
}

/// File names of every applied script, read in one query.
pub async fn applied_names<P: Pool>(pool: &P) -> Result<HashSet<String>> {
    let rows: Vec<AppliedName> =
        Query::new(format!("SELECT `scriptName` FROM `{}`", LEDGER_TABLE))
            .fetch_all(pool)
            .await?;
    Ok(rows.into_iter().map(|r| r.script_name).collect())
}

/// All ledger entries, lowest id first.
pub async fn entries<P: Pool>(pool: &P) -> Result<Vec<LedgerEntry>> {
    Query::new(format!(
        "{} ORDER BY `id`",
        sql::select_all(&LedgerEntry::TABLE)
    ))
    .fetch_all(pool)
    .await
}

pub async fn record<P: Pool>(pool: &P, entry: &LedgerEntry) -> Result<()> {
    Repository::<P, LedgerEntry>::new(pool).insert(entry).await?;
    Ok(())
}

/// Highest recorded id, 0 for an empty ledger.
pub async fn max_id<P: Pool>(pool: &P) -> Result<u32> {
    Query::new(format!(
        "SELECT COALESCE(MAX(`id`), 0) FROM `{}`",
        LEDGER_TABLE
    ))
    .fetch_scalar(pool)
    .await
}
