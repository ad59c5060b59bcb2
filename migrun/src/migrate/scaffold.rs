//! Creation of the next numbered script file

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::error::{Error, Result};
use crate::traits::Pool;

use super::{discover, ensure_ledger, ledger};

/// Label used when the caller gives none.
pub const DEFAULT_LABEL: &str = "next";

/// Header written into every new script.
pub fn script_template(created_at: NaiveDateTime) -> String {
    format!(
        "-- New migration script\n-- Created: {}\n\n",
        created_at.format("%Y-%m-%d %H:%M:%S")
    )
}

/// Reduce `label` to `[A-Za-z0-9_]` so it is safe in a file name.
pub fn sanitize_label(label: &str) -> String {
    let cleaned: String = label
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if cleaned.trim_matches('_').is_empty() {
        DEFAULT_LABEL.to_string()
    } else {
        cleaned
    }
}

/// Write `<n>_<label>.sql` into `dir`, where `n` is one past the highest
/// number found in either the ledger or the directory.
///
/// The directory is created if needed. An existing file is never replaced.
pub async fn create_next_script<P: Pool>(pool: &P, dir: &Path, label: &str) -> Result<PathBuf> {
    ensure_ledger(pool).await?;
    let recorded = ledger::max_id(pool)
        .await
        .map_err(|e| Error::LedgerRead(Box::new(e)))?;

    tokio::fs::create_dir_all(dir).await?;
    let on_disk = discover(dir)
        .await?
        .iter()
        .map(|s| s.sequence)
        .max()
        .unwrap_or(0);

    let file_name = format!(
        "{}_{}.sql",
        next_sequence(recorded.max(on_disk), label)?,
        sanitize_label(label)
    );
    let path = dir.join(&file_name);

    let mut file = match tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            return Err(Error::ScriptExists(path));
        }
        Err(e) => return Err(e.into()),
    };
    file.write_all(script_template(Local::now().naive_local()).as_bytes())
        .await?;
    file.flush().await?;

    info!(script = %file_name, "created migration script");
    Ok(path)
}

fn next_sequence(highest: u32, label: &str) -> Result<u32> {
    highest
        .checked_add(1)
        .filter(|n| i32::try_from(*n).is_ok())
        .ok_or_else(|| Error::InvalidScriptName(format!("{}_{}", highest, label)))
}
