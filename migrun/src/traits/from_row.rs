//! Row access and row-to-struct mapping

use crate::error::Result;
use crate::traits::FromValue;
use crate::value::Value;

/// A database row addressed by column name.
pub trait Row {
    /// Get a value from the row by column name.
    ///
    /// Returns [`Error::ColumnNotFound`](crate::Error::ColumnNotFound) if the
    /// column is not part of the result set.
    fn get_value(&self, column: &str) -> Result<Value>;
}

/// Typed access on top of [`Row`].
pub trait RowExt: Row {
    /// Get a typed value from the row by column name.
    fn get<T: FromValue>(&self, column: &str) -> Result<T> {
        T::from_value(self.get_value(column)?)
    }
}

impl<R: Row + ?Sized> RowExt for R {}

/// Types that can be built from a result row.
///
/// Usually derived with `#[derive(FromRow)]`:
///
/// ```ignore
/// use migrun::FromRow;
///
/// #[derive(FromRow)]
/// pub struct Applied {
///     #[migrun(rename = "scriptName")]
///     pub script_name: String,
/// }
/// ```
pub trait FromRow: Sized {
    /// Construct an instance of this type from a database row.
    fn from_row<R: Row>(row: &R) -> Result<Self>;

    /// Columns read by [`FromRow::from_row`], in field order.
    fn column_names() -> &'static [&'static str];
}
