//! Error types for migrun

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for migrun operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the database layer and the migration runner
#[derive(Error, Debug)]
pub enum Error {
    /// MySQL driver error
    #[error("MySQL error: {0}")]
    MySql(#[from] mysql_async::Error),

    /// Type conversion error
    #[error("Type conversion error: expected {expected}, got {actual}")]
    TypeConversion {
        expected: &'static str,
        actual: String,
    },

    /// Column not found in row
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Null value for non-optional field
    #[error("Unexpected null value for column: {0}")]
    UnexpectedNull(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(String),

    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Filesystem error outside of a specific script
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A record type declares no key column
    #[error("Table `{0}` has no key column")]
    MissingKey(&'static str),

    /// The ledger table could not be created
    #[error("Failed to initialize migration ledger: {0}")]
    LedgerInit(#[source] Box<Error>),

    /// The set of applied scripts could not be read
    #[error("Failed to read migration ledger: {0}")]
    LedgerRead(#[source] Box<Error>),

    /// The scripts directory could not be listed
    #[error("Failed to list scripts directory {}: {source}", path.display())]
    ScriptDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A candidate script name whose sequence number does not fit the ledger key
    #[error("Invalid migration script name: {0}")]
    InvalidScriptName(String),

    /// A pending script could not be read
    #[error("Failed to read migration {script}: {source}")]
    ScriptRead {
        script: String,
        #[source]
        source: std::io::Error,
    },

    /// A pending script failed to execute
    #[error("Migration {script} failed: {source}")]
    ScriptExecution {
        script: String,
        #[source]
        source: Box<Error>,
    },

    /// A script executed but its ledger entry could not be written
    #[error("Migration {script} was executed but could not be recorded: {source}")]
    LedgerRecord {
        script: String,
        #[source]
        source: Box<Error>,
    },

    /// Scaffolding refused to overwrite an existing script
    #[error("Migration script already exists: {}", .0.display())]
    ScriptExists(PathBuf),
}

impl Error {
    /// Name of the migration script this error is attached to, if any.
    pub fn script(&self) -> Option<&str> {
        match self {
            Error::ScriptRead { script, .. }
            | Error::ScriptExecution { script, .. }
            | Error::LedgerRecord { script, .. } => Some(script),
            Error::InvalidScriptName(name) => Some(name),
            _ => None,
        }
    }
}
