//! Utility functions for CLI operations.

use std::io::{self, IsTerminal, Write};
use std::path::Path;

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use sfy_core::FetchOptions;

use crate::style;

/// Progress display for a packet download.
///
/// Holds the bar (if any) so the caller can clear it once the fetch is done,
/// and the [`FetchOptions`] that drive it.
pub struct FetchProgress {
    bar: Option<ProgressBar>,
    options: FetchOptions,
}

impl FetchProgress {
    /// Create a progress bar on stderr unless `quiet` or stderr is not a terminal.
    pub fn new(dev: &str, quiet: bool) -> Self {
        if quiet || !io::stderr().is_terminal() {
            return Self::hidden();
        }

        let bar = style::download_progress_bar(dev);
        let pb = bar.clone();
        let options = FetchOptions::default().with_progress(move |done, total| {
            pb.set_length(total as u64);
            pb.set_position(done as u64);
        });
        Self {
            bar: Some(bar),
            options,
        }
    }

    /// No progress display.
    pub fn hidden() -> Self {
        Self {
            bar: None,
            options: FetchOptions::default(),
        }
    }

    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// Clear the bar from the terminal.
    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

/// Show a spinner on stderr while a hub request runs, unless `quiet` or
/// stderr is not a terminal.
pub fn spinner(message: &str, quiet: bool) -> Option<ProgressBar> {
    if quiet || !io::stderr().is_terminal() {
        None
    } else {
        Some(style::request_spinner(message))
    }
}

/// Clear a spinner from [`spinner`].
pub fn finish_spinner(spinner: Option<ProgressBar>) {
    if let Some(sp) = spinner {
        sp.finish_and_clear();
    }
}

/// Write output to file or stdout
pub fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        None => {
            print!("{}", content);
            io::stdout().flush()?;
        }
    }
    Ok(())
}
