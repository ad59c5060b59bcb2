//! migrun - numbered SQL script migrations for MySQL
//!
//! Applies `<digits>*.sql` files from a directory exactly once each, in
//! numeric order, and records them in a `management_migrations` ledger.
//! Around the runner sits a thin `mysql_async` layer and a small record
//! layer used by the runner's own ledger.
//!
//! # Features
//!
//! - **Migration runner**: [`Migrator`] with `run`, `run_atomic`, `pending`, `status`
//! - **Scaffolding**: [`migrate::scaffold::create_next_script`]
//! - **Record layer**: `#[derive(FromRow, Record)]`, SQL built from static
//!   column lists, generic [`Repository`]
//! - **Schema checks**: [`schema::column_exists`] and friends
//!
//! # Example
//!
//! ```ignore
//! use migrun::{Migrator, MySqlPool};
//!
//! async fn migrate(url: &str) -> migrun::Result<()> {
//!     let pool = MySqlPool::new(url)?;
//!     let report = Migrator::new(&pool, "./migrations").run().await?;
//!     println!("{} applied, {} already present", report.applied.len(), report.skipped.len());
//!     Ok(())
//! }
//! ```

// Lets the derive macros' `migrun::` paths resolve inside this crate too.
extern crate self as migrun;

pub mod error;
pub mod migrate;
pub mod mysql;
pub mod query;
pub mod repository;
pub mod schema;
pub mod sql;
pub mod traits;
pub mod value;

pub use migrun_derive::{FromRow, Record};

pub use error::{Error, Result};
pub use migrate::{LedgerEntry, MigrationReport, MigrationScript, MigrationStatus, Migrator};
pub use mysql::{MySqlPool, MySqlPoolBuilder, MySqlRow, MySqlTransaction};
pub use query::Query;
pub use repository::Repository;
pub use traits::{
    ColumnSpec, ExecuteResult, FromRow, FromValue, IsolationLevel, Pool, Record, Row, RowExt,
    TableSpec, ToValue, Transaction, Transactional,
};
pub use value::Value;
