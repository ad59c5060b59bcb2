//! Core traits for migrun

mod from_row;
mod from_value;
mod pool;
mod record;
mod to_value;
mod transaction;

pub use from_row::{FromRow, Row, RowExt};
pub use from_value::FromValue;
pub use pool::{ExecuteResult, Pool};
pub use record::{ColumnSpec, Record, TableSpec};
pub use to_value::ToValue;
pub use transaction::{IsolationLevel, Transaction, Transactional};
