//! Statically declared table layouts

use crate::value::Value;

/// One column of a [`TableSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Column name as it appears in the database
    pub name: &'static str,
    /// Part of the row's key (used by UPDATE/DELETE/get-one)
    pub key: bool,
    /// Filled in by the database (AUTO_INCREMENT); left out of INSERT
    pub generated: bool,
}

impl ColumnSpec {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            key: false,
            generated: false,
        }
    }

    pub const fn key(mut self) -> Self {
        self.key = true;
        self
    }

    pub const fn generated(mut self) -> Self {
        self.generated = true;
        self
    }
}

/// Table name plus ordered column list for a record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    pub name: &'static str,
    pub columns: &'static [ColumnSpec],
}

impl TableSpec {
    /// The key column, if the table declares one.
    pub fn key(&self) -> Option<&'static ColumnSpec> {
        self.columns.iter().find(|c| c.key)
    }

    /// Columns written by INSERT.
    pub fn insert_columns(&self) -> impl Iterator<Item = &'static ColumnSpec> {
        self.columns.iter().filter(|c| !c.generated)
    }

    /// Columns written by UPDATE.
    pub fn update_columns(&self) -> impl Iterator<Item = &'static ColumnSpec> {
        self.columns.iter().filter(|c| !c.key && !c.generated)
    }
}

/// A struct persisted as one row of a table.
///
/// Derive it with `#[derive(Record)]`; the derive emits [`Record::TABLE`]
/// from the field list at compile time.
///
/// ```ignore
/// use migrun::{FromRow, Record};
///
/// #[derive(FromRow, Record)]
/// #[migrun(table = "templates")]
/// pub struct Template {
///     #[migrun(generated)]
///     pub id: i64,
///     pub name: String,
///     pub content: String,
/// }
/// ```
pub trait Record {
    /// Table layout, columns in field order.
    const TABLE: TableSpec;

    /// One value per entry of `TABLE.columns`, in the same order.
    fn values(&self) -> Vec<Value>;

    /// Value of the key column.
    fn key_value(&self) -> Value;

    /// Values for the columns returned by [`TableSpec::insert_columns`].
    fn insert_values(&self) -> Vec<Value> {
        Self::TABLE
            .columns
            .iter()
            .zip(self.values())
            .filter(|(c, _)| !c.generated)
            .map(|(_, v)| v)
            .collect()
    }

    /// Values for [`TableSpec::update_columns`] followed by the key value.
    fn update_values(&self) -> Vec<Value> {
        let mut values: Vec<Value> = Self::TABLE
            .columns
            .iter()
            .zip(self.values())
            .filter(|(c, _)| !c.key && !c.generated)
            .map(|(_, v)| v)
            .collect();
        values.push(self.key_value());
        values
    }
}
