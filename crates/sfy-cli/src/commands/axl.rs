//! Acceleration export command implementation.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use sfy_core::netcdf::write_netcdf;
use sfy_core::{AxlTimeseries, Buoy, Hub, TimeWindow};
use tracing::info;

use crate::format::FormatOptions;
use crate::style;
use crate::util::FetchProgress;

/// Arguments for `axl ts`.
pub struct AxlTsArgs<'a> {
    pub dev: &'a str,
    pub output: &'a Path,
    pub window: &'a TimeWindow,
    pub attrs: &'a [(String, String)],
    pub quiet: bool,
    pub opts: &'a FormatOptions,
}

pub async fn cmd_axl_ts<H: Hub + ?Sized>(hub: &H, args: AxlTsArgs<'_>) -> Result<()> {
    let AxlTsArgs {
        dev,
        output,
        window,
        attrs,
        quiet,
        opts,
    } = args;

    let buoy = Buoy::open(hub, dev).await?;
    info!("Exporting acceleration of {} to {}", buoy.info(), output.display());

    let progress = FetchProgress::new(buoy.dev(), quiet);
    let packets = buoy
        .axl_packets_in_range(window, progress.options())
        .await
        .with_context(|| format!("Failed to fetch packets of {}", buoy.dev()))?;
    progress.finish();

    if packets.is_empty() {
        bail!("No acceleration packets found for {} in the given time range", buoy.info());
    }

    let extra: BTreeMap<String, String> = attrs.iter().cloned().collect();
    let extra = (!extra.is_empty()).then_some(extra);
    let ts = AxlTimeseries::from_packets(buoy.info(), &packets, extra)
        .context("Failed to assemble timeseries")?;

    write_netcdf(&ts, output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if !quiet {
        eprintln!(
            "{}",
            style::format_success(
                &format!(
                    "Wrote {} samples from {} packets to {}",
                    ts.time().len(),
                    packets.len(),
                    output.display()
                ),
                opts.no_color
            )
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{DEV, hub};
    use sfy_core::netcdf::read_netcdf;
    use time::macros::datetime;

    #[tokio::test]
    async fn test_axl_ts_writes_netcdf() {
        let hub = hub();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wavebug01.nc");
        let attrs = vec![("deployment".to_string(), "Barents Sea".to_string())];

        cmd_axl_ts(
            &hub,
            AxlTsArgs {
                dev: DEV,
                output: &path,
                window: &TimeWindow::unbounded(),
                attrs: &attrs,
                quiet: true,
                opts: &FormatOptions::default(),
            },
        )
        .await
        .unwrap();

        let ts = read_netcdf(&path).unwrap();
        assert_eq!(ts.time(), &[90_000.0, 90_500.0]);
        assert_eq!(ts.w_z(), &[5.0, 6.0]);
        assert_eq!(ts.lon(), &[Some(10.0)]);
        assert_eq!(ts.storage_id(), &[Some(3)]);
        assert_eq!(ts.attrs().buoy_name, "WAVEBUG01");
        assert_eq!(
            ts.attrs().extra.get("deployment").map(String::as_str),
            Some("Barents Sea")
        );
    }

    #[tokio::test]
    async fn test_axl_ts_empty_range_fails_without_file() {
        let hub = hub();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.nc");

        let err = cmd_axl_ts(
            &hub,
            AxlTsArgs {
                dev: DEV,
                output: &path,
                window: &TimeWindow::new(Some(datetime!(2030-01-01 0:00 UTC)), None),
                attrs: &[],
                quiet: true,
                opts: &FormatOptions::default(),
            },
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("No acceleration packets"));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_axl_ts_reserved_attr_rejected() {
        let hub = hub();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.nc");
        let attrs = vec![("homepage".to_string(), "x".to_string())];

        let err = cmd_axl_ts(
            &hub,
            AxlTsArgs {
                dev: DEV,
                output: &path,
                window: &TimeWindow::unbounded(),
                attrs: &attrs,
                quiet: true,
                opts: &FormatOptions::default(),
            },
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("Failed to assemble timeseries"));
        assert!(!path.exists());
    }
}
