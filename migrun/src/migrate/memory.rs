//! In-memory stand-in for a MySQL pool, just enough for the runner.
//!
//! Understands the ledger statements the runner issues and treats any
//! other script text as the script itself; text containing `INVALID` fails.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::error::{Error, Result};
use crate::traits::{
    ExecuteResult, FromRow, FromValue, IsolationLevel, Pool, Row, Transaction, Transactional,
};
use crate::value::Value;

use super::ledger::{LedgerEntry, LEDGER_TABLE};

#[derive(Debug, Clone, Default)]
struct State {
    ledger_created: bool,
    ledger: Vec<LedgerEntry>,
    executed: Vec<String>,
    last_script_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default)]
struct Faults {
    ledger_init: bool,
    record: Option<String>,
}

struct MemoryRow(HashMap<&'static str, Value>);

impl Row for MemoryRow {
    fn get_value(&self, column: &str) -> Result<Value> {
        self.0
            .get(column)
            .cloned()
            .ok_or_else(|| Error::ColumnNotFound(column.to_string()))
    }
}

fn ledger_row(entry: &LedgerEntry) -> MemoryRow {
    MemoryRow(HashMap::from([
        ("id", Value::from(entry.id)),
        ("name", Value::from(entry.name.as_str())),
        ("scriptName", Value::from(entry.script_name.as_str())),
        ("createdAt", Value::from(entry.created_at)),
    ]))
}

impl State {
    fn script(&mut self, faults: &Faults, sql: &str) -> Result<()> {
        if sql.starts_with("CREATE TABLE IF NOT EXISTS `management_migrations`") {
            if faults.ledger_init {
                return Err(Error::Query("CREATE command denied".into()));
            }
            self.ledger_created = true;
            return Ok(());
        }
        if sql.contains("INVALID") {
            return Err(Error::Query("You have an error in your SQL syntax".into()));
        }
        self.executed.push(sql.to_string());
        self.last_script_at = Some(chrono::Local::now().naive_local());
        Ok(())
    }

    fn execute(&mut self, faults: &Faults, sql: &str, params: Vec<Value>) -> Result<ExecuteResult> {
        if !sql.starts_with(&format!("INSERT INTO `{}`", LEDGER_TABLE)) {
            return Err(Error::Query(format!("unexpected statement: {}", sql)));
        }
        let mut params = params.into_iter();
        let mut next = || params.next().unwrap_or(Value::Null);
        let entry = LedgerEntry {
            id: u32::from_value(next())?,
            name: String::from_value(next())?,
            script_name: String::from_value(next())?,
            created_at: NaiveDateTime::from_value(next())?,
        };
        if faults.record.as_deref() == Some(entry.script_name.as_str()) {
            return Err(Error::Query("Lock wait timeout exceeded".into()));
        }
        if self.ledger.iter().any(|e| e.id == entry.id) {
            return Err(Error::Query(format!("Duplicate entry '{}'", entry.id)));
        }
        self.ledger.push(entry);
        Ok(ExecuteResult {
            rows_affected: 1,
            last_insert_id: None,
        })
    }

    fn rows(&self, sql: &str) -> Result<Vec<MemoryRow>> {
        if !self.ledger_created {
            return Err(Error::Query(format!("Table '{}' doesn't exist", LEDGER_TABLE)));
        }
        if !sql.contains(LEDGER_TABLE) {
            return Err(Error::Query(format!("unexpected query: {}", sql)));
        }
        let mut entries = self.ledger.clone();
        entries.sort_by_key(|e| e.id);
        Ok(entries.iter().map(ledger_row).collect())
    }

    fn scalar(&self, sql: &str) -> Result<Value> {
        if !sql.contains("MAX(`id`)") {
            return Err(Error::Query(format!("unexpected query: {}", sql)));
        }
        Ok(Value::from(self.ledger.iter().map(|e| e.id).max().unwrap_or(0)))
    }
}

fn map_rows<T: FromRow>(rows: Vec<MemoryRow>) -> Result<Vec<T>> {
    rows.iter().map(T::from_row).collect()
}

#[derive(Clone, Default)]
pub(crate) struct MemoryPool {
    state: Arc<Mutex<State>>,
    faults: Faults,
}

impl MemoryPool {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_ledger_init(mut self) -> Self {
        self.faults.ledger_init = true;
        self
    }

    pub(crate) fn fail_record(mut self, script: &str) -> Self {
        self.faults.record = Some(script.to_string());
        self
    }

    /// Pretend `script` was applied by an earlier run.
    pub(crate) fn seed(&self, script: &str, id: u32) {
        let mut state = self.state.lock().unwrap();
        state.ledger_created = true;
        state.ledger.push(LedgerEntry {
            id,
            name: script.trim_end_matches(".sql").to_string(),
            script_name: script.to_string(),
            created_at: chrono::Local::now().naive_local(),
        });
    }

    pub(crate) fn executed(&self) -> Vec<String> {
        self.state.lock().unwrap().executed.clone()
    }

    pub(crate) fn ledger(&self) -> Vec<LedgerEntry> {
        self.state.lock().unwrap().ledger.clone()
    }

    /// When the most recent script finished.
    pub(crate) fn last_script_at(&self) -> Option<NaiveDateTime> {
        self.state.lock().unwrap().last_script_at
    }

    pub(crate) fn ledger_created(&self) -> bool {
        self.state.lock().unwrap().ledger_created
    }
}

#[async_trait]
impl Pool for MemoryPool {
    async fn execute(&self, sql: &str, params: Vec<Value>) -> Result<ExecuteResult> {
        self.state.lock().unwrap().execute(&self.faults, sql, params)
    }

    async fn execute_script(&self, sql: &str) -> Result<()> {
        self.state.lock().unwrap().script(&self.faults, sql)
    }

    async fn fetch_all<T: FromRow + Send>(&self, sql: &str, _params: Vec<Value>) -> Result<Vec<T>> {
        let rows = self.state.lock().unwrap().rows(sql)?;
        map_rows(rows)
    }

    async fn fetch_optional<T: FromRow + Send>(
        &self,
        sql: &str,
        params: Vec<Value>,
    ) -> Result<Option<T>> {
        Ok(self.fetch_all(sql, params).await?.into_iter().next())
    }

    async fn fetch_scalar<T: FromValue + Send>(&self, sql: &str, _params: Vec<Value>) -> Result<T> {
        let value = self.state.lock().unwrap().scalar(sql)?;
        T::from_value(value)
    }
}

/// Works on a copy of the pool state, written back on commit.
pub(crate) struct MemoryTx {
    target: Arc<Mutex<State>>,
    staged: Mutex<Option<State>>,
    faults: Faults,
}

impl MemoryTx {
    fn with_staged<R>(&self, f: impl FnOnce(&mut State) -> Result<R>) -> Result<R> {
        let mut staged = self.staged.lock().unwrap();
        let state = staged
            .as_mut()
            .ok_or_else(|| Error::Query("Transaction already consumed".into()))?;
        f(state)
    }
}

#[async_trait]
impl Pool for MemoryTx {
    async fn execute(&self, sql: &str, params: Vec<Value>) -> Result<ExecuteResult> {
        self.with_staged(|s| s.execute(&self.faults, sql, params))
    }

    async fn execute_script(&self, sql: &str) -> Result<()> {
        self.with_staged(|s| s.script(&self.faults, sql))
    }

    async fn fetch_all<T: FromRow + Send>(&self, sql: &str, _params: Vec<Value>) -> Result<Vec<T>> {
        map_rows(self.with_staged(|s| s.rows(sql))?)
    }

    async fn fetch_optional<T: FromRow + Send>(
        &self,
        sql: &str,
        params: Vec<Value>,
    ) -> Result<Option<T>> {
        Ok(self.fetch_all(sql, params).await?.into_iter().next())
    }

    async fn fetch_scalar<T: FromValue + Send>(&self, sql: &str, _params: Vec<Value>) -> Result<T> {
        T::from_value(self.with_staged(|s| s.scalar(sql))?)
    }
}

impl Transaction for MemoryTx {
    async fn commit(&self) -> Result<()> {
        let staged = self.with_staged(|s| Ok(s.clone()))?;
        *self.target.lock().unwrap() = staged;
        *self.staged.lock().unwrap() = None;
        Ok(())
    }

    async fn rollback(&self) -> Result<()> {
        *self.staged.lock().unwrap() = None;
        Ok(())
    }
}

impl Transactional for MemoryPool {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<Self::Tx> {
        self.begin_with(IsolationLevel::default()).await
    }

    async fn begin_with(&self, _level: IsolationLevel) -> Result<Self::Tx> {
        let snapshot = self.state.lock().unwrap().clone();
        Ok(MemoryTx {
            target: Arc::clone(&self.state),
            staged: Mutex::new(Some(snapshot)),
            faults: self.faults.clone(),
        })
    }
}
