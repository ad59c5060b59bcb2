//! SQL text for a [`TableSpec`]
//!
//! Every builder returns `?`-placeholder SQL. Parameters come from the
//! matching [`Record`](crate::Record) methods in the same order.

use crate::error::{Error, Result};
use crate::traits::{ColumnSpec, TableSpec};

fn quoted<'a>(columns: impl Iterator<Item = &'a ColumnSpec>) -> Vec<String> {
    columns.map(|c| format!("`{}`", c.name)).collect()
}

fn column_list(table: &TableSpec) -> String {
    quoted(table.columns.iter()).join(", ")
}

fn key_of(table: &TableSpec) -> Result<&'static ColumnSpec> {
    table.key().ok_or(Error::MissingKey(table.name))
}

/// `SELECT <columns> FROM <table>`
pub fn select_all(table: &TableSpec) -> String {
    format!("SELECT {} FROM `{}`", column_list(table), table.name)
}

/// `SELECT <columns> FROM <table> WHERE <condition>`
///
/// The condition is inserted as written; bind its placeholders separately.
pub fn select_where(table: &TableSpec, condition: &str) -> String {
    format!("{} WHERE {}", select_all(table), condition)
}

/// `SELECT <columns> FROM <table> WHERE <key> = ?`
pub fn select_by_key(table: &TableSpec) -> Result<String> {
    let key = key_of(table)?;
    Ok(select_where(table, &format!("`{}` = ?", key.name)))
}

/// `INSERT INTO <table> (<non-generated columns>) VALUES (?, ...)`
pub fn insert(table: &TableSpec) -> String {
    let columns = quoted(table.insert_columns());
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!(
        "INSERT INTO `{}` ({}) VALUES ({})",
        table.name,
        columns.join(", "),
        placeholders
    )
}

/// `UPDATE <table> SET <col> = ?, ... WHERE <key> = ?`
pub fn update(table: &TableSpec) -> Result<String> {
    let key = key_of(table)?;
    let assignments = table
        .update_columns()
        .map(|c| format!("`{}` = ?", c.name))
        .collect::<Vec<_>>();
    if assignments.is_empty() {
        return Err(Error::Query(format!(
            "table `{}` has no updatable columns",
            table.name
        )));
    }
    Ok(format!(
        "UPDATE `{}` SET {} WHERE `{}` = ?",
        table.name,
        assignments.join(", "),
        key.name
    ))
}

/// `DELETE FROM <table> WHERE <key> = ?`
pub fn delete_by_key(table: &TableSpec) -> Result<String> {
    let key = key_of(table)?;
    Ok(format!("DELETE FROM `{}` WHERE `{}` = ?", table.name, key.name))
}
