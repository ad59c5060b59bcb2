//! Fluent query builder

use std::borrow::Cow;

use crate::error::Result;
use crate::traits::{ExecuteResult, FromRow, FromValue, Pool, ToValue};
use crate::value::Value;

/// A SQL statement plus its bound parameters.
///
/// The SQL may be borrowed (`Query::new("SELECT ...")`) or built at run time
/// (`Query::new(format!(...))`).
///
/// ```ignore
/// let names: Vec<Applied> = Query::new("SELECT `scriptName` FROM `management_migrations`")
///     .fetch_all(&pool)
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct Query<'q> {
    sql: Cow<'q, str>,
    params: Vec<Value>,
}

impl<'q> Query<'q> {
    pub fn new(sql: impl Into<Cow<'q, str>>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Bind the next `?` placeholder.
    pub fn bind<T: ToValue>(mut self, value: T) -> Self {
        self.params.push(value.to_value());
        self
    }

    /// Bind several placeholders in order.
    pub fn bind_all<T: ToValue>(mut self, values: &[T]) -> Self {
        self.params.extend(values.iter().map(ToValue::to_value));
        self
    }

    /// Append already converted values.
    pub fn bind_values(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.params.extend(values);
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub async fn execute<P: Pool>(self, pool: &P) -> Result<ExecuteResult> {
        pool.execute(&self.sql, self.params).await
    }

    pub async fn fetch_all<T: FromRow + Send, P: Pool>(self, pool: &P) -> Result<Vec<T>> {
        pool.fetch_all(&self.sql, self.params).await
    }

    pub async fn fetch_optional<T: FromRow + Send, P: Pool>(self, pool: &P) -> Result<Option<T>> {
        pool.fetch_optional(&self.sql, self.params).await
    }

    pub async fn fetch_one<T: FromRow + Send, P: Pool>(self, pool: &P) -> Result<T> {
        pool.fetch_one(&self.sql, self.params).await
    }

    /// Fetch the first column of the first row.
    pub async fn fetch_scalar<T: FromValue + Send, P: Pool>(self, pool: &P) -> Result<T> {
        pool.fetch_scalar(&self.sql, self.params).await
    }
}
