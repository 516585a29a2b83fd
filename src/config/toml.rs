//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Webhook generation section
    #[serde(default)]
    pub generate: GenerateSection,

    /// Final query submission section
    #[serde(default)]
    pub submit: SubmitSection,
}

/// Webhook generation section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerateSection {
    /// Whether to make the generation call (default: true)
    pub enabled: Option<bool>,

    /// Generation endpoint
    pub url: Option<String>,

    /// Candidate name
    pub name: Option<String>,

    /// Registration number
    pub reg_no: Option<String>,

    /// Contact e-mail
    pub email: Option<String>,
}

/// Final query submission section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmitSection {
    /// Whether to submit (default: true)
    pub enabled: Option<bool>,

    /// Fallback submission endpoint
    pub url: Option<String>,

    /// Final query text
    pub final_query: Option<String>,

    /// Delay before submission, in milliseconds
    pub delay_ms: Option<u64>,

    /// Token wait timeout, in milliseconds
    pub wait_for_token_timeout_ms: Option<u64>,

    /// Token poll interval, in milliseconds
    pub wait_for_token_poll_ms: Option<u64>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# hiring-handshake configuration file

[generate]
# Make the webhook generation call at startup (default: true)
# enabled = true

# Generation endpoint
# url = "https://bfhldevapigw.healthrx.co.in/hiring/generateWebhook/JAVA"

# Payload sent to the generation endpoint
name = "John Doe"
reg_no = "REG12347"
email = "john@example.com"

[submit]
# Submit the final query after generation (default: true)
# enabled = true

# Used only when the generation response carries no callback URL
# url = "https://bfhldevapigw.healthrx.co.in/hiring/testWebhook/JAVA"

# Query text sent as {"finalQuery": ...}; submission is skipped while blank
final_query = ""

# Delay before submission starts, in milliseconds (default: 0)
# delay_ms = 0

# How long to wait for the token, in milliseconds (default: 10000)
# wait_for_token_timeout_ms = 10000

# How often to check for the token, in milliseconds (default: 300, minimum 50)
# wait_for_token_poll_ms = 300
"#
    .to_string()
}
