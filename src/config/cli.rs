//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Hiring handshake: generate a webhook, then submit the final query to it.
///
/// Runs once and exits. Failures are logged; they never change the exit code.
#[derive(Debug, Parser)]
#[command(name = "hiring-handshake")]
#[command(version, about, long_about = None)]
#[allow(clippy::struct_excessive_bools)] // CLI flags are naturally boolean
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Webhook generation endpoint
    #[arg(long = "generate-url")]
    pub generate_url: Option<String>,

    /// Candidate name sent to the generation endpoint
    #[arg(long)]
    pub name: Option<String>,

    /// Registration number sent to the generation endpoint
    #[arg(long = "reg-no")]
    pub reg_no: Option<String>,

    /// E-mail sent to the generation endpoint
    #[arg(long)]
    pub email: Option<String>,

    /// Skip the webhook generation call
    #[arg(long = "skip-generate")]
    pub skip_generate: bool,

    /// Submission endpoint used when generation returns no callback URL
    #[arg(long = "submit-url")]
    pub submit_url: Option<String>,

    /// Final query text to submit
    #[arg(long = "final-query")]
    pub final_query: Option<String>,

    /// Skip the final query submission
    #[arg(long = "skip-submit")]
    pub skip_submit: bool,

    /// Delay before submission starts, in milliseconds
    #[arg(long = "delay-ms")]
    pub delay_ms: Option<u64>,

    /// How long to wait for the token, in milliseconds
    #[arg(long = "token-timeout-ms")]
    pub token_timeout_ms: Option<u64>,

    /// How often to check for the token, in milliseconds (minimum 50)
    #[arg(long = "token-poll-ms")]
    pub token_poll_ms: Option<u64>,

    /// Path to configuration file
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short)]
    pub verbose: bool,
}

/// Subcommands for hiring-handshake
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = "hiring-handshake.toml")]
        output: PathBuf,
    },
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }
}
