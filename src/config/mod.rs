//! Configuration module.
//!
//! Settings are resolved from, lowest to highest precedence: built-in
//! defaults, the TOML config file, environment variables, CLI flags.

pub mod loader;

pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_config_path, default_log_path,
    load_config_file, load_config_with_precedence, merge_config, resolve, CliOverrides,
    ConfigError, ConfigFile, ResolvedConfig,
};
