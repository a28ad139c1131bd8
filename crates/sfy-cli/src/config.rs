//! Configuration file management.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::cli::{Cli, StyleMode};

/// Log filter used when none is configured.
pub const DEFAULT_LOG: &str = "info";

/// Configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// URL of the data hub
    #[serde(default)]
    pub server: Option<String>,

    /// Read token for the data hub
    #[serde(default)]
    pub token: Option<String>,

    /// Default log filter
    #[serde(default)]
    pub log: Option<String>,

    /// Disable colored output
    #[serde(default)]
    pub no_color: bool,

    /// Visual styling mode (rich, minimal, plain)
    #[serde(default)]
    pub style: Option<String>,
}

impl Config {
    /// Get the config file path
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sfy")
            .join("config.toml")
    }

    /// Load config from file, or return default if not found
    pub fn load() -> Self {
        let path = Self::path();
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config: {}", e);
                    }
                },
                Err(e) => {
                    eprintln!("Warning: Failed to read config: {}", e);
                }
            }
        }
        Self::default()
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

/// Settings after merging flags, environment and the config file.
///
/// Flags and environment variables are already merged by clap, so the
/// config file only fills in what neither of them set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server: Option<String>,
    pub token: Option<String>,
    pub log: String,
    pub no_color: bool,
    pub style: StyleMode,
    pub quiet: bool,
}

impl Settings {
    pub fn resolve(cli: &Cli, config: &Config) -> Self {
        Self {
            server: cli.server.clone().or_else(|| config.server.clone()),
            token: cli.token.clone().or_else(|| config.token.clone()),
            log: cli
                .log
                .clone()
                .or_else(|| config.log.clone())
                .unwrap_or_else(|| DEFAULT_LOG.to_string()),
            no_color: cli.no_color || config.no_color,
            style: cli
                .style
                .or_else(|| config.style.as_deref().and_then(parse_style))
                .unwrap_or_default(),
            quiet: cli.quiet,
        }
    }

    /// The hub URL, or an error explaining how to set one.
    pub fn require_server(&self) -> Result<&str> {
        match self.server.as_deref() {
            Some(s) if !s.trim().is_empty() => Ok(s),
            _ => bail!(
                "No data hub configured. Use --server <URL>, set the SFY_SERVER environment variable,\n\
                 or run 'sfy config set server <URL>'."
            ),
        }
    }
}

/// Parse a style name as stored in the config file.
pub fn parse_style(s: &str) -> Option<StyleMode> {
    match s.trim().to_ascii_lowercase().as_str() {
        "rich" => Some(StyleMode::Rich),
        "minimal" => Some(StyleMode::Minimal),
        "plain" => Some(StyleMode::Plain),
        _ => None,
    }
}

/// Parse a boolean config value.
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, FromArgMatches};

    /// Parse flags only; env fallbacks are removed so the caller's shell
    /// cannot leak `SFY_*` or `NO_COLOR` into the result.
    fn cli(args: &[&str]) -> Cli {
        let mut full = vec!["sfy"];
        full.extend_from_slice(args);
        full.push("config");
        full.push("path");
        let matches = Cli::command()
            .mut_args(|arg| arg.env(None::<&'static str>))
            .try_get_matches_from(full)
            .unwrap();
        Cli::from_arg_matches(&matches).unwrap()
    }

    #[test]
    fn test_cli_helper_ignores_environment() {
        let bare = cli(&[]);
        assert!(bare.server.is_none());
        assert!(bare.token.is_none());
        assert!(bare.log.is_none());
        assert!(bare.style.is_none());
        assert!(!bare.no_color);

        let flags = cli(&["--no-color", "--style", "plain"]);
        assert!(flags.no_color);
        assert_eq!(flags.style, Some(StyleMode::Plain));
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let config = Config {
            server: Some("https://wavebug.met.no/sfy".to_string()),
            token: Some("secret".to_string()),
            log: Some("debug".to_string()),
            no_color: true,
            style: Some("plain".to_string()),
        };
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_config_partial_file() {
        let parsed: Config = toml::from_str("server = \"http://localhost:3000\"\n").unwrap();
        assert_eq!(parsed.server.as_deref(), Some("http://localhost:3000"));
        assert!(parsed.token.is_none());
        assert!(!parsed.no_color);
    }

    #[test]
    fn test_config_path_ends_with_sfy() {
        let path = Config::path();
        assert!(path.ends_with("sfy/config.toml"));
    }

    #[test]
    fn test_flag_overrides_config() {
        let config = Config {
            server: Some("http://from-file".to_string()),
            log: Some("warn".to_string()),
            ..Default::default()
        };
        let settings = Settings::resolve(
            &cli(&["--server", "http://from-flag", "--log", "debug"]),
            &config,
        );
        assert_eq!(settings.server.as_deref(), Some("http://from-flag"));
        assert_eq!(settings.log, "debug");
    }

    #[test]
    fn test_config_fills_in_and_defaults() {
        let config = Config {
            server: Some("http://from-file".to_string()),
            style: Some("minimal".to_string()),
            ..Default::default()
        };
        let settings = Settings::resolve(&cli(&[]), &config);
        assert_eq!(settings.require_server().unwrap(), "http://from-file");
        assert_eq!(settings.style, StyleMode::Minimal);

        let settings = Settings::resolve(&cli(&[]), &Config::default());
        assert_eq!(settings.style, StyleMode::Rich);
    }

    #[test]
    fn test_missing_server_is_descriptive() {
        let settings = Settings {
            server: None,
            token: None,
            log: DEFAULT_LOG.to_string(),
            no_color: false,
            style: StyleMode::Rich,
            quiet: false,
        };
        let err = settings.require_server().unwrap_err();
        assert!(err.to_string().contains("SFY_SERVER"));
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_style("Plain"), Some(StyleMode::Plain));
        assert_eq!(parse_style("fancy"), None);
        assert_eq!(parse_bool("yes"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
