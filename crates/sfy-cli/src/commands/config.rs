//! Config command implementation.

use anyhow::{Result, bail};

use crate::cli::{ConfigAction, ConfigKey};
use crate::config::{Config, parse_bool, parse_style};
use crate::format::FormatOptions;
use crate::style;
use crate::util::write_output;

pub fn cmd_config(action: ConfigAction, opts: &FormatOptions) -> Result<()> {
    match action {
        ConfigAction::Path => {
            write_output(None, &format!("{}\n", Config::path().display()))?;
        }
        ConfigAction::Show => {
            let config = Config::load();
            write_output(None, &show(&config))?;
        }
        ConfigAction::Get { key } => {
            let config = Config::load();
            if let Some(value) = get_value(&config, key) {
                write_output(None, &format!("{}\n", value))?;
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load();
            set_value(&mut config, key, &value)?;
            config.save()?;
            eprintln!(
                "{}",
                style::format_success(&format!("Set {}", key_name(key)), opts.no_color)
            );
        }
        ConfigAction::Unset { key } => {
            let mut config = Config::load();
            unset_value(&mut config, key);
            config.save()?;
            eprintln!(
                "{}",
                style::format_success(&format!("Unset {}", key_name(key)), opts.no_color)
            );
        }
    }
    Ok(())
}

fn key_name(key: ConfigKey) -> &'static str {
    match key {
        ConfigKey::Server => "server",
        ConfigKey::Token => "token",
        ConfigKey::Log => "log",
        ConfigKey::NoColor => "no_color",
        ConfigKey::Style => "style",
    }
}

fn get_value(config: &Config, key: ConfigKey) -> Option<String> {
    match key {
        ConfigKey::Server => config.server.clone(),
        ConfigKey::Token => config.token.clone(),
        ConfigKey::Log => config.log.clone(),
        ConfigKey::NoColor => Some(config.no_color.to_string()),
        ConfigKey::Style => config.style.clone(),
    }
}

fn set_value(config: &mut Config, key: ConfigKey, value: &str) -> Result<()> {
    match key {
        ConfigKey::Server => {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                bail!("Server must be an http:// or https:// URL, got '{}'", value);
            }
            config.server = Some(value.to_string());
        }
        ConfigKey::Token => config.token = Some(value.to_string()),
        ConfigKey::Log => config.log = Some(value.to_string()),
        ConfigKey::NoColor => match parse_bool(value) {
            Some(b) => config.no_color = b,
            None => bail!("Invalid boolean '{}'. Use true or false", value),
        },
        ConfigKey::Style => match parse_style(value) {
            Some(_) => config.style = Some(value.trim().to_ascii_lowercase()),
            None => bail!("Invalid style '{}'. Use rich, minimal or plain", value),
        },
    }
    Ok(())
}

fn unset_value(config: &mut Config, key: ConfigKey) {
    match key {
        ConfigKey::Server => config.server = None,
        ConfigKey::Token => config.token = None,
        ConfigKey::Log => config.log = None,
        ConfigKey::NoColor => config.no_color = false,
        ConfigKey::Style => config.style = None,
    }
}

fn show(config: &Config) -> String {
    let unset = || "(not set)".to_string();
    let mut output = format!("# {}\n", Config::path().display());
    output.push_str(&format!(
        "server   = {}\n",
        config.server.clone().unwrap_or_else(unset)
    ));
    output.push_str(&format!(
        "token    = {}\n",
        config.token.as_ref().map(|_| "********".to_string()).unwrap_or_else(unset)
    ));
    output.push_str(&format!(
        "log      = {}\n",
        config.log.clone().unwrap_or_else(unset)
    ));
    output.push_str(&format!("no_color = {}\n", config.no_color));
    output.push_str(&format!(
        "style    = {}\n",
        config.style.clone().unwrap_or_else(unset)
    ));
    output
}
