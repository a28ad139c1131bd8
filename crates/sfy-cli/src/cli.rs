//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use sfy_core::TimeWindow;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

/// Visual styling mode for output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum StyleMode {
    /// Standard styling with colors
    Minimal,
    /// Rich styling with tables and full formatting (default)
    #[default]
    Rich,
    /// Plain text with no decorations (for scripting)
    Plain,
}

/// Reusable time window arguments
#[derive(Debug, Clone, Default, Args)]
pub struct WindowArgs {
    /// Only packets received at or after this time (RFC3339 or YYYY-MM-DD[ HH:MM:SS], UTC)
    #[arg(long, value_parser = parse_datetime)]
    pub start: Option<OffsetDateTime>,

    /// Only packets received before this time (RFC3339 or YYYY-MM-DD[ HH:MM:SS], UTC)
    #[arg(long, value_parser = parse_datetime)]
    pub end: Option<OffsetDateTime>,
}

impl WindowArgs {
    /// The half-open window `[start, end)`.
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start, self.end)
    }
}

#[derive(Parser)]
#[command(name = "sfy")]
#[command(author, version, about = "CLI for sfy wave buoy data", long_about = None)]
pub struct Cli {
    /// Log level or filter, e.g. "debug" or "sfy_core=trace"
    #[arg(long, global = true, env = "SFY_LOG")]
    pub log: Option<String>,

    /// URL of the data hub
    #[arg(long, global = true, env = "SFY_SERVER")]
    pub server: Option<String>,

    /// Read token for the data hub
    #[arg(long, global = true, env = "SFY_READ_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Visual styling mode (minimal, rich, plain)
    #[arg(long, global = true, value_enum, env = "SFY_STYLE")]
    pub style: Option<StyleMode>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List buoys, or the acceleration packets of one buoy
    List {
        /// Buoy device id or part of its id or name
        dev: Option<String>,

        #[command(flatten)]
        window: WindowArgs,
    },

    /// Print one packet as JSON
    Json {
        /// Buoy device id or part of its id or name
        dev: String,

        /// File name of the packet
        file: String,
    },

    /// Print log and health messages of a buoy
    Log {
        /// Buoy device id or part of its id or name
        dev: String,

        #[command(flatten)]
        window: WindowArgs,
    },

    /// Position track of a buoy
    Track {
        #[command(subcommand)]
        command: TrackCommand,
    },

    /// Acceleration data of a buoy
    Axl {
        #[command(subcommand)]
        command: AxlCommand,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Track subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum TrackCommand {
    /// Draw the track on a map (SVG)
    Map {
        /// Buoy device id or part of its id or name
        dev: String,

        /// Draw the line only, without point markers
        #[arg(long)]
        fast: bool,

        #[command(flatten)]
        window: WindowArgs,

        /// Map margins as a fraction of the track extent, format: 0.5,0.5
        #[arg(long, value_parser = parse_margins, default_value = "0.2,0.2")]
        margins: (f64, f64),

        /// Save to file instead of writing SVG to stdout
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Write positions as CSV
    Csv {
        #[command(flatten)]
        window: WindowArgs,

        /// Buoy device id or part of its id or name
        dev: String,

        /// Include positions based on cell towers
        #[arg(long)]
        tower: bool,
    },
}

/// Acceleration subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum AxlCommand {
    /// Export the acceleration timeseries to NetCDF
    Ts {
        /// Buoy device id or part of its id or name
        dev: String,

        /// Output file
        output: PathBuf,

        #[command(flatten)]
        window: WindowArgs,

        /// Extra global attribute, can be given several times
        #[arg(long = "attr", value_name = "KEY=VALUE", value_parser = parse_key_val)]
        attrs: Vec<(String, String)>,
    },
}

/// Configuration keys
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ConfigKey {
    /// URL of the data hub
    Server,
    /// Read token for the data hub
    Token,
    /// Default log level
    Log,
    /// Disable colored output
    NoColor,
    /// Visual styling mode
    Style,
}

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Get a configuration value
    Get {
        /// Configuration key
        #[arg(value_enum)]
        key: ConfigKey,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        #[arg(value_enum)]
        key: ConfigKey,
        /// Configuration value
        value: String,
    },

    /// Unset (remove) a configuration value
    Unset {
        /// Configuration key to remove
        #[arg(value_enum)]
        key: ConfigKey,
    },

    /// Show configuration file path
    Path,
}

/// Parse a date/time in RFC3339, `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD` format.
///
/// Times without an offset are taken as UTC.
pub fn parse_datetime(s: &str) -> Result<OffsetDateTime, String> {
    let s = s.trim();

    if let Ok(dt) = OffsetDateTime::parse(s, &Rfc3339) {
        return Ok(dt);
    }

    let s_t = s.replacen('T', " ", 1);
    if let Ok(dt) = PrimitiveDateTime::parse(
        &s_t,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    ) {
        return Ok(dt.assume_utc());
    }

    if let Ok(date) = Date::parse(s, format_description!("[year]-[month]-[day]")) {
        return Ok(date.midnight().assume_utc());
    }

    Err(format!(
        "Invalid date '{}'. Use RFC3339 (e.g., 2024-01-15T10:30:00Z), YYYY-MM-DD HH:MM:SS or YYYY-MM-DD",
        s
    ))
}

/// Parse map margins given as `x,y`.
fn parse_margins(s: &str) -> Result<(f64, f64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("Invalid margins '{}'. Use the format 0.5,0.5", s))?;
    let parse = |v: &str| -> Result<f64, String> {
        let m: f64 = v
            .trim()
            .parse()
            .map_err(|_| format!("'{}' is not a valid number", v.trim()))?;
        if m.is_finite() && m >= 0.0 {
            Ok(m)
        } else {
            Err(format!("Margin must be a non-negative number, got {}", m))
        }
    };
    Ok((parse(x)?, parse(y)?))
}

/// Parse an attribute given as `key=value`.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid attribute '{}'. Use KEY=VALUE", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err("Attribute name must not be empty".to_string());
    }
    Ok((key.to_string(), value.to_string()))
}
