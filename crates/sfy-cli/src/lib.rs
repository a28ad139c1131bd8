//! Command-line interface for sfy wave buoy data.
//!
//! This crate provides the `sfy` binary, which reads buoy data from the sfy
//! data hub and prints, plots or archives it.
//!
//! # Features
//!
//! - **Buoy overview**: last contact and SD-card storage counters of every buoy
//! - **Packet listing**: acceleration packets with position and storage id
//! - **Logs**: health and log messages sent by a buoy
//! - **Tracks**: SVG track maps and position CSV
//! - **Archival**: acceleration timeseries exported to NetCDF
//! - **Configuration file**: persistent hub URL, token and preferences
//! - **Shell completions**: Generate completions for bash, zsh, fish, and PowerShell
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `list` | List buoys, or the acceleration packets of one buoy |
//! | `json` | Print one packet as JSON |
//! | `log` | Print log messages of a buoy |
//! | `track map` | Draw the track of a buoy as SVG |
//! | `track csv` | Write positions of a buoy as CSV |
//! | `axl ts` | Export acceleration data to NetCDF |
//! | `config` | Manage CLI configuration |
//! | `completions` | Generate shell completions |
//!
//! # Configuration
//!
//! The CLI stores configuration in `~/.config/sfy/config.toml` (or platform equivalent).
//! Configuration options include:
//!
//! - `server`: URL of the data hub
//! - `token`: read token for the data hub
//! - `log`: default log filter
//! - `no_color`: Disable colored output
//! - `style`: rich, minimal or plain
//!
//! Command-line flags and environment variables take precedence over the file.
//!
//! # Environment Variables
//!
//! - `SFY_SERVER`: URL of the data hub (overridden by `--server`)
//! - `SFY_READ_TOKEN`: read token (overridden by `--token`)
//! - `SFY_LOG`: log filter (overridden by `--log`)
//! - `NO_COLOR`: Disable colored output when set
//!
//! # Examples
//!
//! List buoys:
//! ```bash
//! sfy list
//! ```
//!
//! List acceleration packets of one buoy in a time range:
//! ```bash
//! sfy list WAVEBUG01 --start 2024-03-01 --end "2024-03-02 12:00:00"
//! ```
//!
//! Save a track map:
//! ```bash
//! sfy track map WAVEBUG01 --margins 0.5,0.5 --save track.svg
//! ```
//!
//! Export GPS positions including cell-tower fixes:
//! ```bash
//! sfy track csv WAVEBUG01 --tower > track.csv
//! ```
//!
//! Archive acceleration data:
//! ```bash
//! sfy axl ts WAVEBUG01 wavebug01.nc --start 2024-03-01 --attr deployment="Barents Sea"
//! ```

// This crate is primarily a binary CLI application.
// The main entry point and command implementations are in main.rs.

// Re-export core dependencies for convenience
pub use sfy_core;
pub use sfy_types;
