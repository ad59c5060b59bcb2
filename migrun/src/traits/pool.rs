//! Pool trait for database connection pools

use crate::error::Result;
use crate::traits::{FromRow, FromValue};
use crate::value::Value;
use async_trait::async_trait;

/// Result of a statement execution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecuteResult {
    /// Number of rows affected by the statement
    pub rows_affected: u64,
    /// Last insert ID (for INSERT statements into AUTO_INCREMENT tables)
    pub last_insert_id: Option<u64>,
}

/// Something that can run SQL: a connection pool or an open transaction.
///
/// Parameterized methods use `?` placeholders and the binary protocol.
/// [`Pool::execute_script`] is the exception: it sends raw text so that a
/// script may contain several statements.
#[async_trait]
pub trait Pool: Send + Sync {
    /// Execute a single parameterized statement.
    async fn execute(&self, sql: &str, params: Vec<Value>) -> Result<ExecuteResult>;

    /// Execute SQL text verbatim, one or more `;`-separated statements.
    ///
    /// No parameters are substituted and the text is not inspected.
    async fn execute_script(&self, sql: &str) -> Result<()>;

    /// Fetch all rows matching the query.
    async fn fetch_all<T: FromRow + Send>(&self, sql: &str, params: Vec<Value>) -> Result<Vec<T>>;

    /// Fetch the first row, if any.
    async fn fetch_optional<T: FromRow + Send>(
        &self,
        sql: &str,
        params: Vec<Value>,
    ) -> Result<Option<T>>;

    /// Fetch exactly one row, returning an error if not found.
    async fn fetch_one<T: FromRow + Send>(&self, sql: &str, params: Vec<Value>) -> Result<T> {
        self.fetch_optional(sql, params)
            .await?
            .ok_or_else(|| crate::Error::Query("Expected one row, found none".to_string()))
    }

    /// Fetch the first column of the first row.
    async fn fetch_scalar<T: FromValue + Send>(&self, sql: &str, params: Vec<Value>)
        -> Result<T>;
}
