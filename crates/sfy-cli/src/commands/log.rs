//! Log command implementation.

use anyhow::{Context, Result};
use sfy_core::{Buoy, Hub, TimeWindow};
use tracing::info;

use crate::format::{FormatOptions, format_log_table};
use crate::util::{FetchProgress, write_output};

pub async fn cmd_log<H: Hub + ?Sized>(
    hub: &H,
    dev: &str,
    window: &TimeWindow,
    quiet: bool,
    opts: &FormatOptions,
) -> Result<()> {
    let content = log_messages(hub, dev, window, quiet, opts).await?;
    write_output(None, &content)
}

async fn log_messages<H: Hub + ?Sized>(
    hub: &H,
    dev: &str,
    window: &TimeWindow,
    quiet: bool,
    opts: &FormatOptions,
) -> Result<String> {
    let buoy = Buoy::open(hub, dev).await?;
    info!("Fetching log entries for {}", buoy.info());

    let progress = FetchProgress::new(buoy.dev(), quiet);
    let packets = buoy
        .log_packets_in_range(window, progress.options())
        .await
        .with_context(|| format!("Failed to fetch log of {}", buoy.dev()))?;
    progress.finish();

    Ok(format_log_table(&packets, opts))
}
