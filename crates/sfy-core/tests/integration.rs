//! Integration tests for sfy-core
//!
//! These tests run the full fetch -> filter -> assemble -> export pipeline
//! against the in-memory [`MockHub`]; no data hub is required.
//!
//! `cargo test --package sfy-core --test integration`

use std::collections::BTreeMap;

use serde_json::json;
use sfy_core::netcdf::{read_netcdf, write_netcdf};
use sfy_core::{
    AxlTimeseries, Buoy, Error, FetchOptions, Hub, MockHub, StorageInfo, TimeWindow,
};
use time::macros::datetime;

const DEV: &str = "dev:864475044203262";

/// Buoy "B1": one 2 Hz acceleration batch and one GPS fix.
fn hub_b1() -> MockHub {
    MockHub::builder()
        .buoy(DEV, Some("B1"))
        .storage(
            DEV,
            StorageInfo {
                current_id: Some(2),
                sent_id: Some(1),
            },
        )
        .event(
            DEV,
            "100000-axl.json",
            json!({
                "file": "axl.qo",
                "received": 100.0,
                "body": {
                    "timestamp": 100_000, "freq": 2.0, "storage_id": 1,
                    "x": [1.0, 2.0], "y": [3.0, 4.0], "z": [5.0, 6.0]
                }
            }),
        )
        .event(
            DEV,
            "200000-gps.json",
            json!({
                "file": "_track.qo",
                "received": 200.0,
                "best_lon": 10.0,
                "best_lat": 60.0,
                "best_location_type": "gps",
                "best_location_when": 200,
                "body": {}
            }),
        )
        .build()
}

/// Test full pipeline: resolve -> fetch -> assemble -> write -> read back
#[tokio::test]
async fn test_pipeline_to_netcdf() {
    let hub = hub_b1();
    let buoy = Buoy::open(&hub, "B1").await.expect("Buoy should resolve");

    let packets = buoy
        .packets_in_range(&TimeWindow::unbounded(), &FetchOptions::default())
        .await
        .expect("Fetch should succeed");
    assert_eq!(packets.len(), 2);

    let extra = BTreeMap::from([("deployment".to_string(), "test".to_string())]);
    let ts = AxlTimeseries::from_packets(buoy.info(), &packets, Some(extra))
        .expect("Assembly should succeed");

    // 2 samples at 100.0 s and 100.5 s
    assert_eq!(ts.time(), &[100_000.0, 100_500.0]);
    // one fix, two received entries
    assert_eq!(ts.fix_count(), 1);
    assert_eq!(ts.lon(), &[None, Some(10.0)]);
    assert_eq!(ts.lat(), &[None, Some(60.0)]);
    assert_eq!(ts.received().len(), 2);
    assert_eq!(ts.package_start().len(), 2);
    assert_eq!(ts.added().len(), 2);
    assert_eq!(ts.storage_id(), &[Some(1), None]);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("b1.nc");
    write_netcdf(&ts, &path).expect("Write should succeed");

    let back = read_netcdf(&path).expect("Read should succeed");
    assert_eq!(back, ts);
    assert_eq!(back.attrs().buoy_device, DEV);
    assert_eq!(back.attrs().buoy_name, "B1");
}

/// Test that only acceleration packets in the window reach the dataset
#[tokio::test]
async fn test_window_limits_dataset() {
    let hub = hub_b1();
    let buoy = Buoy::open(&hub, DEV).await.unwrap();

    let window = TimeWindow::new(
        Some(datetime!(1970-01-01 0:01 UTC)),
        Some(datetime!(1970-01-01 0:03 UTC)),
    );
    let packets = buoy
        .axl_packets_in_range(&window, &FetchOptions::default())
        .await
        .unwrap();
    assert_eq!(packets.len(), 1);

    let ts = AxlTimeseries::from_packets(buoy.info(), &packets, None).unwrap();
    assert_eq!(ts.fix_count(), 0);
    assert_eq!(ts.lon(), &[None]);

    // no fix in the window: the position axis holds only a null entry
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nofix.nc");
    write_netcdf(&ts, &path).unwrap();
    assert_eq!(read_netcdf(&path).unwrap().lon(), &[None]);
}

/// Test that a dataset with an empty axis is never written
#[tokio::test]
async fn test_empty_dataset_not_written() {
    let hub = hub_b1();
    let buoy = Buoy::open(&hub, DEV).await.unwrap();

    let window = TimeWindow::new(Some(datetime!(1970-01-01 0:03 UTC)), None);
    let packets = buoy
        .position_packets_in_range(&window, true, &FetchOptions::default())
        .await
        .unwrap();
    assert_eq!(packets.len(), 1);

    let ts = AxlTimeseries::from_packets(buoy.info(), &packets, None).unwrap();
    assert!(ts.time().is_empty());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.nc");
    let err = write_netcdf(&ts, &path).unwrap_err();
    assert!(matches!(err, Error::EmptyDimension("time")));
    assert!(!path.exists());
}

/// Test trait polymorphism - same code works with the mock and the HTTP client
#[tokio::test]
async fn test_hub_trait_object() {
    async fn count_packets(hub: &dyn Hub, query: &str) -> sfy_core::Result<usize> {
        let buoy = Buoy::open(hub, query).await?;
        Ok(buoy.packet_files().await?.len())
    }

    let hub = hub_b1();
    assert_eq!(count_packets(&hub, "B1").await.unwrap(), 2);
    assert!(matches!(
        count_packets(&hub, "B2").await,
        Err(Error::BuoyNotFound(_))
    ));
}

/// Test that hub failures propagate unchanged
#[tokio::test]
async fn test_hub_failure_propagates() {
    let hub = hub_b1();
    let buoy = Buoy::open(&hub, DEV).await.unwrap();

    hub.set_should_fail(true, Some("maintenance")).await;
    let err = buoy
        .packets_in_range(&TimeWindow::unbounded(), &FetchOptions::default())
        .await
        .unwrap_err();
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "maintenance");
        }
        other => panic!("unexpected error: {other}"),
    }
}
