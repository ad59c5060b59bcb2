//! MySQL backend

mod pool;
mod row;
mod transaction;
mod types;

pub use pool::{MySqlPool, MySqlPoolBuilder};
pub use row::MySqlRow;
pub use transaction::MySqlTransaction;
