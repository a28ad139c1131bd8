//! List command implementation.

use anyhow::{Context, Result};
use sfy_core::{Buoy, Hub, TimeWindow};
use tracing::info;

use crate::format::{
    BuoyRow, FormatOptions, format_axl_table, format_buoy_table, sort_by_last_contact,
};
use crate::util::{FetchProgress, finish_spinner, spinner, write_output};

/// List all buoys, or the acceleration packets of `dev` in `window`.
pub async fn cmd_list<H: Hub + ?Sized>(
    hub: &H,
    dev: Option<&str>,
    window: &TimeWindow,
    quiet: bool,
    opts: &FormatOptions,
) -> Result<()> {
    let content = match dev {
        None => list_buoys(hub, quiet, opts).await?,
        Some(dev) => list_packets(hub, dev, window, quiet, opts).await?,
    };
    write_output(None, &content)
}

async fn list_buoys<H: Hub + ?Sized>(hub: &H, quiet: bool, opts: &FormatOptions) -> Result<String> {
    let sp = spinner("Listing buoys...", quiet);
    let buoys = hub.list_buoys().await.context("Failed to list buoys")?;

    let mut rows = Vec::with_capacity(buoys.len());
    for info in buoys {
        if let Some(sp) = &sp {
            sp.set_message(format!("Checking {}...", info.dev));
        }
        let buoy = Buoy::new(hub, info);
        let last_contact = buoy
            .last_contact()
            .await
            .with_context(|| format!("Failed to fetch last packet of {}", buoy.dev()))?;
        let storage = buoy
            .storage_info()
            .await
            .with_context(|| format!("Failed to fetch storage info of {}", buoy.dev()))?;
        rows.push(BuoyRow {
            info: buoy.info().clone(),
            last_contact,
            storage,
        });
    }
    finish_spinner(sp);

    sort_by_last_contact(&mut rows);
    Ok(format_buoy_table(&rows, opts))
}

async fn list_packets<H: Hub + ?Sized>(
    hub: &H,
    dev: &str,
    window: &TimeWindow,
    quiet: bool,
    opts: &FormatOptions,
) -> Result<String> {
    let buoy = Buoy::open(hub, dev).await?;
    info!("Listing packets for {}", buoy.info());

    let progress = FetchProgress::new(buoy.dev(), quiet);
    let packets = buoy
        .axl_packets_in_range(window, progress.options())
        .await
        .with_context(|| format!("Failed to fetch packets of {}", buoy.dev()))?;
    progress.finish();

    Ok(format_axl_table(buoy.info(), &packets, opts))
}
