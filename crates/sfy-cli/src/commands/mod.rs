//! Command implementations for the CLI.
//!
//! Every command is generic over [`sfy_core::Hub`] so it runs the same
//! against the real hub and the in-memory mock.

mod axl;
mod config;
mod json;
mod list;
mod log;
mod track;

pub use axl::{AxlTsArgs, cmd_axl_ts};
pub use config::cmd_config;
pub use json::cmd_json;
pub use list::cmd_list;
pub use log::cmd_log;
pub use track::{TrackMapArgs, cmd_track_csv, cmd_track_map};
