//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use url::Url;

use crate::generate::{GenerateSettings, GenerationRequest};
use crate::submit::SubmitSettings;

use super::cli::Cli;
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::TomlConfig;

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// Every value has a default, so only malformed input is rejected.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Settings for the generation step
    pub generate: GenerateSettings,

    /// Settings for the submission step
    pub submit: SubmitSettings,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config {{ generate: {} {} (regNo {}), submit: {} fallback {} (query {} chars), \
             delay: {}ms, token_wait: {}ms/{}ms }}",
            on_off(self.generate.enabled),
            self.generate.url,
            self.generate.request.reg_no,
            on_off(self.submit.enabled),
            self.submit.fallback_url,
            self.submit.final_query.trim().chars().count(),
            self.submit.delay.as_millis(),
            self.submit.token_timeout.as_millis(),
            self.submit.token_poll_interval.as_millis(),
        )
    }
}

const fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// Priority: explicit CLI > TOML > built-in defaults. The `--skip-*`
    /// flags can only disable a step; they never re-enable one that the
    /// config file turned off.
    ///
    /// # Errors
    ///
    /// Returns an error if either endpoint URL is invalid.
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let generate = Self::resolve_generate(cli, toml)?;
        let submit = Self::resolve_submit(cli, toml)?;

        Ok(Self {
            generate,
            submit,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    fn resolve_generate(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<GenerateSettings, ConfigError> {
        let section = toml.map(|t| &t.generate);

        let enabled = !cli.skip_generate && section.and_then(|s| s.enabled).unwrap_or(true);

        let url = parse_url(
            field::GENERATE_URL,
            cli.generate_url
                .as_deref()
                .or_else(|| section.and_then(|s| s.url.as_deref()))
                .unwrap_or(defaults::GENERATE_URL),
        )?;

        let request = GenerationRequest {
            name: pick(
                cli.name.as_deref(),
                section.and_then(|s| s.name.as_deref()),
                defaults::NAME,
            ),
            reg_no: pick(
                cli.reg_no.as_deref(),
                section.and_then(|s| s.reg_no.as_deref()),
                defaults::REG_NO,
            ),
            email: pick(
                cli.email.as_deref(),
                section.and_then(|s| s.email.as_deref()),
                defaults::EMAIL,
            ),
        };

        Ok(GenerateSettings {
            enabled,
            url,
            request,
            timeout: GenerateSettings::DEFAULT_TIMEOUT,
        })
    }

    fn resolve_submit(cli: &Cli, toml: Option<&TomlConfig>) -> Result<SubmitSettings, ConfigError> {
        let section = toml.map(|t| &t.submit);

        let enabled = !cli.skip_submit && section.and_then(|s| s.enabled).unwrap_or(true);

        let fallback_url = parse_url(
            field::SUBMIT_URL,
            cli.submit_url
                .as_deref()
                .or_else(|| section.and_then(|s| s.url.as_deref()))
                .unwrap_or(defaults::SUBMIT_URL),
        )?;

        let final_query = pick(
            cli.final_query.as_deref(),
            section.and_then(|s| s.final_query.as_deref()),
            "",
        );

        let delay_ms = cli
            .delay_ms
            .or_else(|| section.and_then(|s| s.delay_ms))
            .unwrap_or(defaults::SUBMIT_DELAY_MS);

        let token_timeout_ms = cli
            .token_timeout_ms
            .or_else(|| section.and_then(|s| s.wait_for_token_timeout_ms))
            .unwrap_or(defaults::TOKEN_TIMEOUT_MS);

        // Values below the gate's floor are accepted; the gate raises them.
        let token_poll_ms = cli
            .token_poll_ms
            .or_else(|| section.and_then(|s| s.wait_for_token_poll_ms))
            .unwrap_or(defaults::TOKEN_POLL_MS);

        Ok(SubmitSettings {
            enabled,
            fallback_url,
            final_query,
            delay: Duration::from_millis(delay_ms),
            token_timeout: Duration::from_millis(token_timeout_ms),
            token_poll_interval: Duration::from_millis(token_poll_ms),
            timeout: SubmitSettings::DEFAULT_TIMEOUT,
        })
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

// Helper functions

fn pick(cli: Option<&str>, toml: Option<&str>, default: &str) -> String {
    cli.or(toml).unwrap_or(default).to_string()
}

fn parse_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
        field,
        url: value.to_string(),
        reason: e.to_string(),
    })
}
