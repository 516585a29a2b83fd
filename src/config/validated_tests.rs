//! Tests for validated configuration.

use std::io::Write;
use std::time::Duration;

use tempfile::{NamedTempFile, tempdir};

use super::ConfigError;
use super::cli::Cli;
use super::defaults;
use super::toml::TomlConfig;
use super::validated::{ValidatedConfig, write_default_config};

/// Helper to create CLI args from a slice
fn cli(args: &[&str]) -> Cli {
    let mut full_args = vec!["hiring-handshake"];
    full_args.extend(args);
    Cli::parse_from_iter(full_args)
}

/// Helper to parse TOML config
fn toml(content: &str) -> TomlConfig {
    TomlConfig::parse(content).unwrap()
}

mod defaults_applied {
    use super::*;

    #[test]
    fn no_input_uses_built_in_defaults() {
        let config = ValidatedConfig::from_raw(&cli(&[]), None).unwrap();

        assert!(config.generate.enabled);
        assert_eq!(config.generate.url.as_str(), defaults::GENERATE_URL);
        assert_eq!(config.generate.request.name, "John Doe");
        assert_eq!(config.generate.request.reg_no, "REG12347");
        assert_eq!(config.generate.request.email, "john@example.com");
        assert_eq!(config.generate.timeout, Duration::from_secs(15));

        assert!(config.submit.enabled);
        assert_eq!(config.submit.fallback_url.as_str(), defaults::SUBMIT_URL);
        assert!(config.submit.final_query.is_empty());
        assert_eq!(config.submit.delay, Duration::ZERO);
        assert_eq!(config.submit.token_timeout, defaults::token_timeout());
        assert_eq!(config.submit.token_poll_interval, defaults::token_poll_interval());
        assert_eq!(config.submit.timeout, Duration::from_secs(20));
        assert!(!config.verbose);
    }

    #[test]
    fn empty_toml_behaves_like_no_toml() {
        let config = ValidatedConfig::from_raw(&cli(&[]), Some(&toml(""))).unwrap();

        assert!(config.generate.enabled);
        assert_eq!(config.submit.token_timeout, Duration::from_millis(10_000));
    }
}

mod precedence {
    use super::*;

    const FILE: &str = r#"
        [generate]
        url = "https://toml.example.com/generate"
        name = "Toml Name"
        reg_no = "REG-TOML"

        [submit]
        url = "https://toml.example.com/submit"
        final_query = "SELECT 'toml';"
        delay_ms = 100
        wait_for_token_timeout_ms = 3000
        wait_for_token_poll_ms = 75
    "#;

    #[test]
    fn toml_overrides_defaults() {
        let config = ValidatedConfig::from_raw(&cli(&[]), Some(&toml(FILE))).unwrap();

        assert_eq!(config.generate.url.as_str(), "https://toml.example.com/generate");
        assert_eq!(config.generate.request.name, "Toml Name");
        assert_eq!(config.generate.request.reg_no, "REG-TOML");
        assert_eq!(config.generate.request.email, "john@example.com");
        assert_eq!(config.submit.fallback_url.as_str(), "https://toml.example.com/submit");
        assert_eq!(config.submit.final_query, "SELECT 'toml';");
        assert_eq!(config.submit.delay, Duration::from_millis(100));
        assert_eq!(config.submit.token_timeout, Duration::from_millis(3000));
        assert_eq!(config.submit.token_poll_interval, Duration::from_millis(75));
    }

    #[test]
    fn cli_overrides_toml() {
        let cli = cli(&[
            "--generate-url",
            "https://cli.example.com/generate",
            "--reg-no",
            "REG-CLI",
            "--final-query",
            "SELECT 'cli';",
            "--token-timeout-ms",
            "500",
        ]);

        let config = ValidatedConfig::from_raw(&cli, Some(&toml(FILE))).unwrap();

        assert_eq!(config.generate.url.as_str(), "https://cli.example.com/generate");
        assert_eq!(config.generate.request.reg_no, "REG-CLI");
        assert_eq!(config.generate.request.name, "Toml Name");
        assert_eq!(config.submit.final_query, "SELECT 'cli';");
        assert_eq!(config.submit.token_timeout, Duration::from_millis(500));
        assert_eq!(config.submit.token_poll_interval, Duration::from_millis(75));
    }

    #[test]
    fn poll_interval_below_floor_is_kept_as_given() {
        let config =
            ValidatedConfig::from_raw(&cli(&["--token-poll-ms", "10"]), None).unwrap();

        assert_eq!(config.submit.token_poll_interval, Duration::from_millis(10));
    }
}

mod enable_flags {
    use super::*;

    #[test]
    fn skip_flags_disable_steps() {
        let config =
            ValidatedConfig::from_raw(&cli(&["--skip-generate", "--skip-submit"]), None).unwrap();

        assert!(!config.generate.enabled);
        assert!(!config.submit.enabled);
    }

    #[test]
    fn toml_can_disable_steps() {
        let file = toml(
            r"
            [generate]
            enabled = false

            [submit]
            enabled = false
        ",
        );

        let config = ValidatedConfig::from_raw(&cli(&[]), Some(&file)).unwrap();

        assert!(!config.generate.enabled);
        assert!(!config.submit.enabled);
    }

    #[test]
    fn skip_flag_wins_over_toml_enabled() {
        let file = toml(
            r"
            [submit]
            enabled = true
        ",
        );

        let config = ValidatedConfig::from_raw(&cli(&["--skip-submit"]), Some(&file)).unwrap();

        assert!(!config.submit.enabled);
        assert!(config.generate.enabled);
    }
}

mod validation {
    use super::*;

    #[test]
    fn invalid_generate_url_is_rejected() {
        let result = ValidatedConfig::from_raw(&cli(&["--generate-url", "not a url"]), None);

        assert!(matches!(
            result,
            Err(ConfigError::InvalidUrl {
                field: "generate.url",
                ..
            })
        ));
    }

    #[test]
    fn invalid_submit_url_from_toml_is_rejected() {
        let file = toml(
            r#"
            [submit]
            url = "://missing-scheme"
        "#,
        );

        let result = ValidatedConfig::from_raw(&cli(&[]), Some(&file));

        assert!(matches!(
            result,
            Err(ConfigError::InvalidUrl {
                field: "submit.url",
                ..
            })
        ));
    }
}

mod loading {
    use super::*;

    #[test]
    fn load_without_config_path_uses_cli_only() {
        let config = ValidatedConfig::load(&cli(&["--final-query", "SELECT 1;"])).unwrap();

        assert_eq!(config.submit.final_query, "SELECT 1;");
    }

    #[test]
    fn load_reads_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[submit]\nfinal_query = \"SELECT 2;\"").unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let config = ValidatedConfig::load(&cli(&["--config", &path])).unwrap();

        assert_eq!(config.submit.final_query, "SELECT 2;");
    }

    #[test]
    fn load_missing_file_returns_file_read_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let result = ValidatedConfig::load(&cli(&["--config", path.to_str().unwrap()]));

        assert!(matches!(result, Err(ConfigError::FileRead { .. })));
    }

    #[test]
    fn load_malformed_file_returns_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[submit\nfinal_query = ").unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let result = ValidatedConfig::load(&cli(&["--config", &path]));

        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn write_default_config_round_trips_through_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hiring-handshake.toml");

        write_default_config(&path).unwrap();
        let config = ValidatedConfig::load(&cli(&["--config", path.to_str().unwrap()])).unwrap();

        assert_eq!(config.generate.request.name, "John Doe");
        assert!(config.submit.final_query.is_empty());
    }

    #[test]
    fn write_default_config_reports_unwritable_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("config.toml");

        let result = write_default_config(&path);

        assert!(matches!(result, Err(ConfigError::FileWrite { .. })));
    }
}

mod display {
    use super::*;

    #[test]
    fn display_summarizes_without_query_text() {
        let config = ValidatedConfig::from_raw(
            &cli(&["--final-query", "SELECT secret_column;", "--skip-generate"]),
            None,
        )
        .unwrap();

        let text = config.to_string();

        assert!(text.contains("generate: off"));
        assert!(text.contains("submit: on"));
        assert!(text.contains("query 21 chars"));
        assert!(!text.contains("secret_column"));
    }
}
