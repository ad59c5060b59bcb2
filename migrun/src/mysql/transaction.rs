//! MySQL transaction implementation

use crate::error::{Error, Result};
use crate::traits::{ExecuteResult, FromRow, FromValue, IsolationLevel, Pool, Transaction};
use crate::value::Value;
use async_trait::async_trait;
use tokio::sync::Mutex;

use super::pool::{exec_drop, exec_first, exec_rows, map_optional, map_rows, map_scalar, query_script};

type Inner = Option<mysql_async::Transaction<'static>>;

/// An open MySQL transaction.
///
/// Dropping it without [`Transaction::commit`] rolls back.
pub struct MySqlTransaction {
    // mysql_async needs &mut for every call while Pool takes &self; a
    // transaction is driven by one task so the lock is never contended.
    inner: Mutex<Inner>,
}

impl MySqlTransaction {
    pub(crate) fn new(tx: mysql_async::Transaction<'static>) -> Self {
        Self {
            inner: Mutex::new(Some(tx)),
        }
    }

    async fn take(&self) -> Result<mysql_async::Transaction<'static>> {
        self.inner
            .lock()
            .await
            .take()
            .ok_or_else(|| Error::Query("Transaction already consumed".to_string()))
    }
}

fn live(inner: &mut Inner) -> Result<&mut mysql_async::Transaction<'static>> {
    inner
        .as_mut()
        .ok_or_else(|| Error::Query("Transaction already consumed".to_string()))
}

#[async_trait]
impl Pool for MySqlTransaction {
    async fn execute(&self, sql: &str, params: Vec<Value>) -> Result<ExecuteResult> {
        let mut guard = self.inner.lock().await;
        let tx = live(&mut guard)?;
        exec_drop(tx, sql, params).await?;
        Ok(ExecuteResult {
            rows_affected: tx.affected_rows(),
            last_insert_id: tx.last_insert_id(),
        })
    }

    async fn execute_script(&self, sql: &str) -> Result<()> {
        let mut guard = self.inner.lock().await;
        query_script(live(&mut guard)?, sql).await
    }

    async fn fetch_all<T: FromRow + Send>(&self, sql: &str, params: Vec<Value>) -> Result<Vec<T>> {
        let mut guard = self.inner.lock().await;
        map_rows(exec_rows(live(&mut guard)?, sql, params).await?)
    }

    async fn fetch_optional<T: FromRow + Send>(
        &self,
        sql: &str,
        params: Vec<Value>,
    ) -> Result<Option<T>> {
        let mut guard = self.inner.lock().await;
        map_optional(exec_first(live(&mut guard)?, sql, params).await?)
    }

    async fn fetch_scalar<T: FromValue + Send>(&self, sql: &str, params: Vec<Value>) -> Result<T> {
        let mut guard = self.inner.lock().await;
        map_scalar(exec_first(live(&mut guard)?, sql, params).await?)
    }
}

impl Transaction for MySqlTransaction {
    async fn commit(&self) -> Result<()> {
        self.take().await?.commit().await?;
        Ok(())
    }

    async fn rollback(&self) -> Result<()> {
        self.take().await?.rollback().await?;
        Ok(())
    }
}

pub(crate) fn to_mysql_isolation(level: IsolationLevel) -> mysql_async::IsolationLevel {
    match level {
        IsolationLevel::ReadUncommitted => mysql_async::IsolationLevel::ReadUncommitted,
        IsolationLevel::ReadCommitted => mysql_async::IsolationLevel::ReadCommitted,
        IsolationLevel::RepeatableRead => mysql_async::IsolationLevel::RepeatableRead,
        IsolationLevel::Serializable => mysql_async::IsolationLevel::Serializable,
    }
}
