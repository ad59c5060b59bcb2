//! Default configuration values - single source of truth

/// Default directory holding the numbered `.sql` scripts
pub const SCRIPTS_DIR: &str = "./migrations";

/// Whether each script and its ledger row share a transaction by default
pub const ATOMIC: bool = false;

/// Config file looked up in the working directory when `--config` is absent
pub const CONFIG_FILE: &str = "migrun";

/// Prefix of the environment variables read by [`super::MigrunConfig::load`]
pub const ENV_PREFIX: &str = "MIGRUN";
