//! Configuration layer for hiring-handshake.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated configuration ([`ValidatedConfig`])
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - Values explicitly passed via command line
//! 2. **TOML config file** - Values from the configuration file
//! 3. **Built-in defaults** - Hardcoded default values
//!
//! Every setting has a default, so the binary runs with no arguments at all.
//! The final query defaults to blank, which makes the submission step a no-op.
//!
//! # Boolean Flag Semantics
//!
//! `--skip-generate` and `--skip-submit` only disable. A step is enabled when
//! the flag is absent and the config file does not set `enabled = false`.
//!
//! # Fixed Parameters
//!
//! The per-call timeouts (15s for generation, 20s per submission attempt) and
//! the 50ms minimum poll interval are not configurable.

mod cli;
pub mod defaults;
mod error;
mod toml;
mod validated;

#[cfg(test)]
mod validated_tests;

pub use cli::{Cli, Command};
pub use error::{ConfigError, field};
pub use toml::{TomlConfig, default_config_template};
pub use validated::{ValidatedConfig, write_default_config};
