//! Track command implementations.

use std::path::Path;

use anyhow::{Context, Result};
use sfy_core::{Buoy, Hub, TimeWindow};
use tracing::info;

use crate::format::{FormatOptions, format_track_csv};
use crate::map;
use crate::style;
use crate::util::{FetchProgress, write_output};

/// Arguments for `track map`.
pub struct TrackMapArgs<'a> {
    pub dev: &'a str,
    pub window: &'a TimeWindow,
    pub fast: bool,
    pub margins: (f64, f64),
    pub save: Option<&'a Path>,
    pub quiet: bool,
    pub opts: &'a FormatOptions,
}

pub async fn cmd_track_map<H: Hub + ?Sized>(hub: &H, args: TrackMapArgs<'_>) -> Result<()> {
    let TrackMapArgs {
        dev,
        window,
        fast,
        margins,
        save,
        quiet,
        opts,
    } = args;

    let (dev, svg) = track_svg(hub, dev, window, fast, margins, quiet).await?;
    write_output(save, &svg)?;

    if let Some(path) = save
        && !quiet
    {
        eprintln!(
            "{}",
            style::format_success(
                &format!("Saved track of {} to {}", dev, path.display()),
                opts.no_color
            )
        );
    }
    Ok(())
}

async fn track_svg<H: Hub + ?Sized>(
    hub: &H,
    dev: &str,
    window: &TimeWindow,
    fast: bool,
    margins: (f64, f64),
    quiet: bool,
) -> Result<(String, String)> {
    let buoy = Buoy::open(hub, dev).await?;
    info!("Plotting track of {}", buoy.info());

    let progress = FetchProgress::new(buoy.dev(), quiet);
    let packets = buoy
        .position_packets_in_range(window, false, progress.options())
        .await
        .with_context(|| format!("Failed to fetch positions of {}", buoy.dev()))?;
    progress.finish();

    let points = map::track_points(&packets);
    let svg = map::render_track_svg(buoy.dev(), &points, margins, fast)
        .context("Failed to draw track")?;
    Ok((buoy.dev().to_string(), svg))
}

pub async fn cmd_track_csv<H: Hub + ?Sized>(
    hub: &H,
    dev: &str,
    window: &TimeWindow,
    tower: bool,
    quiet: bool,
) -> Result<()> {
    let content = track_csv(hub, dev, window, tower, quiet).await?;
    write_output(None, &content)
}

async fn track_csv<H: Hub + ?Sized>(
    hub: &H,
    dev: &str,
    window: &TimeWindow,
    tower: bool,
    quiet: bool,
) -> Result<String> {
    let buoy = Buoy::open(hub, dev).await?;
    info!("Fetching positions of {}", buoy.info());

    let progress = FetchProgress::new(buoy.dev(), quiet);
    let packets = buoy
        .position_packets_in_range(window, !tower, progress.options())
        .await
        .with_context(|| format!("Failed to fetch positions of {}", buoy.dev()))?;
    progress.finish();

    Ok(format_track_csv(buoy.dev(), &packets))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{DEV, hub};
    use crate::format::TRACK_CSV_HEADER;

    #[tokio::test]
    async fn test_track_csv_gps_only() {
        let hub = hub();
        let out = track_csv(&hub, DEV, &TimeWindow::unbounded(), false, true)
            .await
            .unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], TRACK_CSV_HEADER);
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("100000-axl.json"));
        assert!(lines[2].contains("200000-gps.json"));
        assert!(lines[2].contains("1970-01-01T00:03:10Z"));
        assert!(lines[2].ends_with(",4.5"));
        assert!(!out.contains("tower"));
    }

    #[tokio::test]
    async fn test_track_csv_with_tower_keeps_order() {
        let hub = hub();
        let out = track_csv(&hub, DEV, &TimeWindow::unbounded(), true, true)
            .await
            .unwrap();
        let files: Vec<&str> = out
            .lines()
            .skip(1)
            .map(|l| l.split(',').nth(5).unwrap())
            .collect();
        assert_eq!(
            files,
            ["100000-axl.json", "150000-tower.json", "200000-gps.json"]
        );
    }

    #[tokio::test]
    async fn test_track_svg() {
        let hub = hub();
        let (dev, svg) = track_svg(&hub, "WAVEBUG01", &TimeWindow::unbounded(), true, (0.2, 0.2), true)
            .await
            .unwrap();
        assert_eq!(dev, DEV);
        assert!(svg.contains(&format!("Track of {}", DEV)));
    }

    #[tokio::test]
    async fn test_track_map_saves_file() {
        let hub = hub();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.svg");
        let opts = FormatOptions::default();
        cmd_track_map(
            &hub,
            TrackMapArgs {
                dev: DEV,
                window: &TimeWindow::unbounded(),
                fast: false,
                margins: (0.2, 0.2),
                save: Some(&path),
                quiet: true,
                opts: &opts,
            },
        )
        .await
        .unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<circle"));
    }
}
