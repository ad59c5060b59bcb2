//! Layered configuration: TOML file, then `MIGRUN_*` environment variables

pub mod defaults;
mod settings;

pub use settings::MigrunConfig;
