//! MySQL row implementation

use crate::error::{Error, Result};
use crate::traits::Row;
use crate::value::Value;
use mysql_async::Row as MySqlAsyncRow;
use std::collections::HashMap;

use super::types::from_mysql_value;

/// A fully decoded MySQL row keyed by column name.
pub struct MySqlRow {
    values: HashMap<String, Value>,
}

impl MySqlRow {
    pub fn from_mysql_row(row: MySqlAsyncRow) -> Result<Self> {
        let columns = row.columns();
        let raw = row.unwrap();
        let mut values = HashMap::with_capacity(raw.len());

        for (column, value) in columns.iter().zip(raw) {
            values.insert(column.name_str().into_owned(), from_mysql_value(value)?);
        }

        Ok(Self { values })
    }

    /// Take the value of the first column, for scalar queries.
    pub(crate) fn first_value(row: MySqlAsyncRow) -> Result<Value> {
        let value = row
            .unwrap()
            .into_iter()
            .next()
            .ok_or_else(|| Error::Query("Expected at least one column".to_string()))?;
        from_mysql_value(value)
    }
}

impl Row for MySqlRow {
    fn get_value(&self, column: &str) -> Result<Value> {
        self.values
            .get(column)
            .cloned()
            .ok_or_else(|| Error::ColumnNotFound(column.to_string()))
    }
}
