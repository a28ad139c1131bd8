//! JSON command implementation.

use anyhow::{Context, Result};
use sfy_core::{Buoy, Hub};

use crate::format::FormatOptions;
use crate::util::write_output;

pub async fn cmd_json<H: Hub + ?Sized>(
    hub: &H,
    dev: &str,
    file: &str,
    opts: &FormatOptions,
) -> Result<()> {
    let content = packet_json(hub, dev, file, opts).await?;
    write_output(None, &content)
}

async fn packet_json<H: Hub + ?Sized>(
    hub: &H,
    dev: &str,
    file: &str,
    opts: &FormatOptions,
) -> Result<String> {
    let buoy = Buoy::open(hub, dev).await?;
    let event = buoy
        .event(file)
        .await
        .with_context(|| format!("Failed to fetch {} of {}", file, buoy.dev()))?;
    opts.as_json(&event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{DEV, hub};

    #[tokio::test]
    async fn test_packet_json_pretty() {
        let hub = hub();
        let out = packet_json(&hub, DEV, "300000-late.json", &FormatOptions::default())
            .await
            .unwrap();
        assert!(out.contains("\n  \"body\""));
        assert!(out.contains("battery low"));
        assert!(out.ends_with("}\n"));
    }

    #[tokio::test]
    async fn test_packet_json_missing_file() {
        let hub = hub();
        let err = packet_json(&hub, DEV, "nope.json", &FormatOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("nope.json"));
    }
}
