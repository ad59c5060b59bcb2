//! Numbered SQL script migrations
//!
//! A [`Migrator`] applies every `<digits>*.sql` file in a directory that is
//! not yet listed in the `management_migrations` ledger, lowest number
//! first, and records each one after it succeeds. The first failure stops
//! the run; everything recorded before it stays recorded, and the failed
//! script is attempted again on the next run.
//!
//! ```ignore
//! let pool = MySqlPool::new("mysql://root@localhost/app")?;
//! let report = Migrator::new(&pool, "./migrations").run().await?;
//! for script in &report.applied {
//!     println!("applied {script}");
//! }
//! ```

mod ledger;
pub mod scaffold;
mod script;

#[cfg(test)]
mod memory;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::error::{Error, Result};
use crate::traits::{Pool, Transaction, Transactional};

pub use ledger::{LedgerEntry, LEDGER_TABLE};
pub use script::{discover, parse_sequence, MigrationScript};

/// Outcome of a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Scripts executed and recorded by this run, in order
    pub applied: Vec<String>,
    /// Scripts already present in the ledger
    pub skipped: Vec<String>,
}

/// A candidate script paired with its ledger entry, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    pub sequence: u32,
    pub script_name: String,
    pub applied_at: Option<NaiveDateTime>,
}

impl MigrationStatus {
    pub fn is_applied(&self) -> bool {
        self.applied_at.is_some()
    }
}

/// Applies pending scripts from one directory against one database.
///
/// The runner assumes it is the only writer of the ledger while it runs;
/// callers starting several instances at once must serialize them.
pub struct Migrator<'p, P> {
    pool: &'p P,
    scripts_dir: PathBuf,
}

impl<'p, P: Pool> Migrator<'p, P> {
    pub fn new(pool: &'p P, scripts_dir: impl Into<PathBuf>) -> Self {
        Self {
            pool,
            scripts_dir: scripts_dir.into(),
        }
    }

    pub fn scripts_dir(&self) -> &Path {
        &self.scripts_dir
    }

    /// Apply every pending script.
    ///
    /// The script and its ledger entry are written separately: if the
    /// insert fails after the script ran, the error is
    /// [`Error::LedgerRecord`] and the script's effects stay in place
    /// without a ledger entry.
    pub async fn run(&self) -> Result<MigrationReport> {
        self.drive(&Direct { pool: self.pool }).await
    }

    /// Candidate scripts not yet in the ledger, in apply order.
    pub async fn pending(&self) -> Result<Vec<MigrationScript>> {
        let (scripts, applied) = self.scan().await?;
        Ok(scripts
            .into_iter()
            .filter(|s| !applied.contains(&s.file_name))
            .collect())
    }

    /// Every candidate script with the time it was applied, if it was.
    pub async fn status(&self) -> Result<Vec<MigrationStatus>> {
        ensure_ledger(self.pool).await?;
        let scripts = discover(&self.scripts_dir).await?;
        let entries = ledger::entries(self.pool)
            .await
            .map_err(|e| Error::LedgerRead(Box::new(e)))?;

        Ok(scripts
            .into_iter()
            .map(|script| {
                let applied_at = entries
                    .iter()
                    .find(|e| e.script_name == script.file_name)
                    .map(|e| e.created_at);
                MigrationStatus {
                    sequence: script.sequence,
                    script_name: script.file_name,
                    applied_at,
                }
            })
            .collect())
    }

    async fn scan(
        &self,
    ) -> Result<(Vec<MigrationScript>, std::collections::HashSet<String>)> {
        ensure_ledger(self.pool).await?;
        let scripts = discover(&self.scripts_dir).await?;
        debug!(
            dir = %self.scripts_dir.display(),
            candidates = scripts.len(),
            "scanned migration scripts"
        );
        let applied = ledger::applied_names(self.pool)
            .await
            .map_err(|e| Error::LedgerRead(Box::new(e)))?;
        Ok((scripts, applied))
    }

    async fn drive<A: Apply>(&self, applier: &A) -> Result<MigrationReport> {
        let (scripts, applied) = self.scan().await?;
        let mut report = MigrationReport::default();

        for script in scripts {
            if applied.contains(&script.file_name) {
                debug!(script = %script.file_name, "already applied");
                report.skipped.push(script.file_name);
                continue;
            }

            let sql = script.read_sql().await?;
            if let Err(e) = applier.apply(&script, &sql).await {
                error!(script = %script.file_name, error = %e, "migration failed");
                return Err(e);
            }

            info!(script = %script.file_name, sequence = script.sequence, "applied migration");
            report.applied.push(script.file_name);
        }

        info!(
            applied = report.applied.len(),
            skipped = report.skipped.len(),
            "migrations complete"
        );
        Ok(report)
    }
}

impl<'p, P: Transactional> Migrator<'p, P> {
    /// Like [`Migrator::run`], but each script and its ledger entry share
    /// one transaction, committed together or rolled back together.
    ///
    /// MySQL commits implicitly around DDL, so this only closes the gap for
    /// scripts made of DML.
    pub async fn run_atomic(&self) -> Result<MigrationReport> {
        self.drive(&Atomic { pool: self.pool }).await
    }
}

async fn ensure_ledger<P: Pool>(pool: &P) -> Result<()> {
    ledger::ensure_table(pool)
        .await
        .map_err(|e| Error::LedgerInit(Box::new(e)))
}

fn execution_failed(script: &MigrationScript, e: Error) -> Error {
    Error::ScriptExecution {
        script: script.file_name.clone(),
        source: Box::new(e),
    }
}

fn record_failed(script: &MigrationScript, e: Error) -> Error {
    Error::LedgerRecord {
        script: script.file_name.clone(),
        source: Box::new(e),
    }
}

/// Executes one script and writes its ledger entry.
#[async_trait]
trait Apply: Sync {
    async fn apply(&self, script: &MigrationScript, sql: &str) -> Result<()>;
}

/// Ledger row for `script`, stamped with the current local time.
fn entry_now(script: &MigrationScript) -> LedgerEntry {
    LedgerEntry::for_script(script, Local::now().naive_local())
}

struct Direct<'p, P> {
    pool: &'p P,
}

#[async_trait]
impl<P: Pool> Apply for Direct<'_, P> {
    async fn apply(&self, script: &MigrationScript, sql: &str) -> Result<()> {
        self.pool
            .execute_script(sql)
            .await
            .map_err(|e| execution_failed(script, e))?;
        ledger::record(self.pool, &entry_now(script))
            .await
            .map_err(|e| record_failed(script, e))
    }
}

struct Atomic<'p, P> {
    pool: &'p P,
}

#[async_trait]
impl<P: Transactional> Apply for Atomic<'_, P> {
    async fn apply(&self, script: &MigrationScript, sql: &str) -> Result<()> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| execution_failed(script, e))?;

        if let Err(e) = tx.execute_script(sql).await {
            let _ = tx.rollback().await;
            return Err(execution_failed(script, e));
        }
        if let Err(e) = ledger::record(&tx, &entry_now(script)).await {
            let _ = tx.rollback().await;
            return Err(record_failed(script, e));
        }
        tx.commit().await.map_err(|e| record_failed(script, e))
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryPool;
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn scripts(files: &[(&str, &str)]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, sql) in files {
            fs::write(dir.path().join(name), sql).unwrap();
        }
        dir
    }

    #[tokio::test]
    async fn test_applies_in_numeric_order() {
        let dir = scripts(&[
            ("2_x.sql", "CREATE TABLE x (id INT);"),
            ("10_y.sql", "CREATE TABLE y (id INT);"),
            ("1_z.sql", "CREATE TABLE z (id INT);"),
        ]);
        let pool = MemoryPool::new();

        let report = Migrator::new(&pool, dir.path()).run().await.unwrap();

        assert_eq!(report.applied, ["1_z.sql", "2_x.sql", "10_y.sql"]);
        assert_eq!(
            pool.executed(),
            [
                "CREATE TABLE z (id INT);",
                "CREATE TABLE x (id INT);",
                "CREATE TABLE y (id INT);"
            ]
        );
        let ids: Vec<u32> = pool.ledger().iter().map(|e| e.id).collect();
        assert_eq!(ids, [1, 2, 10]);
    }

    #[tokio::test]
    async fn test_byte_order_mark_stripped() {
        let dir = scripts(&[("1_a.sql", "\u{FEFF}CREATE TABLE t (id INT);")]);
        let pool = MemoryPool::new();

        Migrator::new(&pool, dir.path()).run().await.unwrap();

        assert_eq!(pool.executed(), ["CREATE TABLE t (id INT);"]);
    }

    #[tokio::test]
    async fn test_created_at_taken_after_script_runs() {
        let dir = scripts(&[("1_a.sql", "A")]);
        let pool = MemoryPool::new();

        Migrator::new(&pool, dir.path()).run().await.unwrap();

        let ran_at = pool.last_script_at().unwrap();
        assert!(pool.ledger()[0].created_at >= ran_at);
    }

    #[tokio::test]
    async fn test_second_run_is_a_no_op() {
        let dir = scripts(&[("1_a.sql", "A"), ("2_b.sql", "B")]);
        let pool = MemoryPool::new();
        let migrator = Migrator::new(&pool, dir.path());

        migrator.run().await.unwrap();
        let report = migrator.run().await.unwrap();

        assert!(report.applied.is_empty());
        assert_eq!(report.skipped, ["1_a.sql", "2_b.sql"]);
        assert_eq!(pool.executed().len(), 2);
        assert_eq!(pool.ledger().len(), 2);
    }

    #[tokio::test]
    async fn test_resumes_from_partial_ledger() {
        let dir = scripts(&[("1_z.sql", "Z"), ("2_x.sql", "X")]);
        let pool = MemoryPool::new();
        pool.seed("1_z.sql", 1);

        let report = Migrator::new(&pool, dir.path()).run().await.unwrap();

        assert_eq!(report.applied, ["2_x.sql"]);
        assert_eq!(pool.executed(), ["X"]);
    }

    #[tokio::test]
    async fn test_ignores_non_candidates() {
        let dir = scripts(&[
            ("notes.txt", "not sql"),
            ("readme_1.sql", "not a migration"),
            ("1_a.sql", "A"),
        ]);
        let pool = MemoryPool::new();

        let report = Migrator::new(&pool, dir.path()).run().await.unwrap();

        assert_eq!(report.applied, ["1_a.sql"]);
        assert_eq!(pool.executed(), ["A"]);
    }

    #[tokio::test]
    async fn test_failure_stops_and_rerun_resumes() {
        let dir = scripts(&[
            ("1_ok.sql", "OK"),
            ("2_bad.sql", "INVALID"),
            ("3_later.sql", "LATER"),
        ]);
        let pool = MemoryPool::new();
        let migrator = Migrator::new(&pool, dir.path());

        let err = migrator.run().await.unwrap_err();
        assert!(matches!(err, Error::ScriptExecution { ref script, .. } if script == "2_bad.sql"));
        assert_eq!(err.script(), Some("2_bad.sql"));
        assert_eq!(pool.executed(), ["OK"]);
        let recorded: Vec<String> = pool.ledger().into_iter().map(|e| e.script_name).collect();
        assert_eq!(recorded, ["1_ok.sql"]);

        fs::write(dir.path().join("2_bad.sql"), "FIXED").unwrap();
        let report = migrator.run().await.unwrap();

        assert_eq!(report.applied, ["2_bad.sql", "3_later.sql"]);
        assert_eq!(report.skipped, ["1_ok.sql"]);
        assert_eq!(pool.executed(), ["OK", "FIXED", "LATER"]);
    }

    #[tokio::test]
    async fn test_unreadable_script_stops_run() {
        let dir = scripts(&[("1_a.sql", "A"), ("3_c.sql", "C")]);
        fs::write(dir.path().join("2_b.sql"), [0xC3u8, 0x28, 0xFF]).unwrap();
        let pool = MemoryPool::new();

        let err = Migrator::new(&pool, dir.path()).run().await.unwrap_err();

        assert!(matches!(err, Error::ScriptRead { .. }));
        assert_eq!(err.script(), Some("2_b.sql"));
        assert_eq!(pool.executed(), ["A"]);
        let recorded: Vec<String> = pool.ledger().into_iter().map(|e| e.script_name).collect();
        assert_eq!(recorded, ["1_a.sql"]);
    }

    #[tokio::test]
    async fn test_oversized_sequence_rejected_before_anything_runs() {
        let dir = scripts(&[("1_a.sql", "A"), ("99999999999_big.sql", "BIG")]);
        let pool = MemoryPool::new();

        let err = Migrator::new(&pool, dir.path()).run().await.unwrap_err();

        assert!(matches!(err, Error::InvalidScriptName(ref name) if name == "99999999999_big.sql"));
        assert!(pool.executed().is_empty());
        assert!(pool.ledger().is_empty());
    }

    #[tokio::test]
    async fn test_creates_ledger_on_fresh_target() {
        let dir = scripts(&[]);
        let pool = MemoryPool::new();
        assert!(!pool.ledger_created());

        let report = Migrator::new(&pool, dir.path()).run().await.unwrap();

        assert!(pool.ledger_created());
        assert_eq!(report, MigrationReport::default());
    }

    #[tokio::test]
    async fn test_ledger_init_failure_touches_nothing() {
        let dir = scripts(&[("1_a.sql", "A")]);
        let pool = MemoryPool::new().fail_ledger_init();

        let err = Migrator::new(&pool, dir.path()).run().await.unwrap_err();

        assert!(matches!(err, Error::LedgerInit(_)));
        assert!(pool.executed().is_empty());
    }

    #[tokio::test]
    async fn test_record_failure_leaves_script_applied_but_unrecorded() {
        let dir = scripts(&[("1_a.sql", "A"), ("2_b.sql", "B"), ("3_c.sql", "C")]);
        let pool = MemoryPool::new().fail_record("2_b.sql");

        let err = Migrator::new(&pool, dir.path()).run().await.unwrap_err();

        assert!(matches!(err, Error::LedgerRecord { ref script, .. } if script == "2_b.sql"));
        assert_eq!(pool.executed(), ["A", "B"]);
        assert_eq!(pool.ledger().len(), 1);
    }

    #[tokio::test]
    async fn test_atomic_record_failure_rolls_back_script() {
        let dir = scripts(&[("1_a.sql", "A"), ("2_b.sql", "B")]);
        let pool = MemoryPool::new().fail_record("2_b.sql");

        let err = Migrator::new(&pool, dir.path())
            .run_atomic()
            .await
            .unwrap_err();

        assert!(matches!(err, Error::LedgerRecord { .. }));
        assert_eq!(pool.executed(), ["A"]);
        assert_eq!(pool.ledger().len(), 1);
    }

    #[tokio::test]
    async fn test_atomic_applies_like_direct() {
        let dir = scripts(&[("2_b.sql", "B"), ("1_a.sql", "A")]);
        let pool = MemoryPool::new();

        let report = Migrator::new(&pool, dir.path()).run_atomic().await.unwrap();

        assert_eq!(report.applied, ["1_a.sql", "2_b.sql"]);
        assert_eq!(pool.executed(), ["A", "B"]);
    }

    #[tokio::test]
    async fn test_pending_and_status() {
        let dir = scripts(&[("1_a.sql", "A"), ("2_b.sql", "B")]);
        let pool = MemoryPool::new();
        pool.seed("1_a.sql", 1);
        let migrator = Migrator::new(&pool, dir.path());

        let pending = migrator.pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].file_name, "2_b.sql");

        let status = migrator.status().await.unwrap();
        assert_eq!(status.len(), 2);
        assert!(status[0].is_applied());
        assert!(!status[1].is_applied());
        assert_eq!(status[1].sequence, 2);
    }
}
