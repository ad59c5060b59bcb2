//! Discovery of numbered script files

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// A candidate script found on disk.
///
/// The SQL text is only read when the script is about to be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationScript {
    /// Leading digit run of the file name; apply order and ledger id
    pub sequence: u32,
    /// Full file name, the script's identity in the ledger
    pub file_name: String,
    pub path: PathBuf,
}

impl MigrationScript {
    /// File name without its extension.
    pub fn name(&self) -> &str {
        Path::new(&self.file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.file_name)
    }

    /// Script text, minus a leading UTF-8 byte-order mark.
    pub async fn read_sql(&self) -> Result<String> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| Error::ScriptRead {
                script: self.file_name.clone(),
                source,
            })?;
        Ok(match text.strip_prefix('\u{FEFF}') {
            Some(rest) => rest.to_string(),
            None => text,
        })
    }
}

/// Sequence number of a candidate file name.
///
/// Returns `Ok(None)` for names that are not candidates: no leading digit or
/// an extension other than `.sql`. A digit run too large for the ledger's
/// `INT` key is an error rather than a silent skip.
pub fn parse_sequence(file_name: &str) -> Result<Option<u32>> {
    let is_sql = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("sql"));
    let digits = file_name.len() - file_name.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if !is_sql || digits == 0 {
        return Ok(None);
    }

    file_name[..digits]
        .parse::<u32>()
        .ok()
        .filter(|n| i32::try_from(*n).is_ok())
        .map(Some)
        .ok_or_else(|| Error::InvalidScriptName(file_name.to_string()))
}

/// Candidate scripts in `dir`, in apply order.
///
/// Sorted by sequence number, then by file name so that two files sharing
/// a number always come out in the same order.
pub async fn discover(dir: &Path) -> Result<Vec<MigrationScript>> {
    let listing_error = |source: std::io::Error| Error::ScriptDirectory {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = tokio::fs::read_dir(dir).await.map_err(listing_error)?;
    let mut scripts = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(listing_error)? {
        if !entry.file_type().await.map_err(listing_error)?.is_file() {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str().map(str::to_owned) else {
            debug!(path = %entry.path().display(), "skipping non UTF-8 file name");
            continue;
        };
        match parse_sequence(&file_name)? {
            Some(sequence) => scripts.push(MigrationScript {
                sequence,
                file_name,
                path: entry.path(),
            }),
            None => debug!(file = %file_name, "not a migration script"),
        }
    }

    scripts.sort_by(|a, b| {
        a.sequence
            .cmp(&b.sequence)
            .then_with(|| a.file_name.cmp(&b.file_name))
    });

    for pair in scripts.windows(2) {
        if pair[0].sequence == pair[1].sequence {
            warn!(
                sequence = pair[0].sequence,
                first = %pair[0].file_name,
                second = %pair[1].file_name,
                "duplicate migration sequence number"
            );
        }
    }

    Ok(scripts)
}
