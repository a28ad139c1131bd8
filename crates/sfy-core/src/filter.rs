//! Time-window filtering and packet views.
//!
//! All views return packets sorted ascending by receipt time. The window is
//! half-open, `[start, end)`, and either bound may be left open.
//!
//! # Example
//!
//! ```
//! use sfy_core::filter::TimeWindow;
//! use time::macros::datetime;
//!
//! let window = TimeWindow::new(Some(datetime!(2024-01-01 0:00 UTC)), None);
//! assert!(window.contains(datetime!(2024-06-01 0:00 UTC)));
//! assert!(!window.contains(datetime!(2023-12-31 23:59 UTC)));
//! ```

use sfy_types::{Packet, PacketKind};
use time::OffsetDateTime;

/// A half-open `[start, end)` time window with optional bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeWindow {
    /// Inclusive lower bound, open when `None`.
    pub start: Option<OffsetDateTime>,
    /// Exclusive upper bound, open when `None`.
    pub end: Option<OffsetDateTime>,
}

impl TimeWindow {
    /// Create a window from optional bounds.
    #[must_use]
    pub fn new(start: Option<OffsetDateTime>, end: Option<OffsetDateTime>) -> Self {
        Self { start, end }
    }

    /// A window containing every time.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Whether `t` falls inside the window.
    #[must_use]
    pub fn contains(&self, t: OffsetDateTime) -> bool {
        if let Some(start) = self.start
            && t < start
        {
            return false;
        }
        if let Some(end) = self.end
            && t >= end
        {
            return false;
        }
        true
    }

    /// Lower bound in epoch milliseconds, `0` when open.
    #[must_use]
    pub fn start_ms(&self) -> i64 {
        self.start.map(to_ms).unwrap_or(0)
    }

    /// Upper bound in epoch milliseconds, `i64::MAX` when open.
    #[must_use]
    pub fn end_ms(&self) -> i64 {
        self.end.map(to_ms).unwrap_or(i64::MAX)
    }
}

fn to_ms(t: OffsetDateTime) -> i64 {
    i64::try_from(t.unix_timestamp_nanos() / 1_000_000).unwrap_or(i64::MAX)
}

/// Keep packets received inside `window`, sorted by receipt time.
///
/// The sort is stable, so packets received at the same instant keep the
/// order they were given in.
#[must_use]
pub fn in_window(packets: impl IntoIterator<Item = Packet>, window: &TimeWindow) -> Vec<Packet> {
    let mut packets: Vec<Packet> = packets
        .into_iter()
        .filter(|p| window.contains(p.received))
        .collect();
    packets.sort_by_key(|p| p.received);
    packets
}

/// Keep acceleration packets only.
#[must_use]
pub fn axl_only(packets: impl IntoIterator<Item = Packet>) -> Vec<Packet> {
    of_kind(packets, PacketKind::Axl)
}

/// Keep health/log packets only.
#[must_use]
pub fn health_only(packets: impl IntoIterator<Item = Packet>) -> Vec<Packet> {
    of_kind(packets, PacketKind::Health)
}

fn of_kind(packets: impl IntoIterator<Item = Packet>, kind: PacketKind) -> Vec<Packet> {
    packets.into_iter().filter(|p| p.kind() == kind).collect()
}

/// Keep packets carrying a position fix.
#[must_use]
pub fn with_position(packets: impl IntoIterator<Item = Packet>) -> Vec<Packet> {
    packets
        .into_iter()
        .filter(|p| p.position.is_some())
        .collect()
}

/// Drop every fix that is not a GPS fix, preserving order.
#[must_use]
pub fn gps_only(packets: impl IntoIterator<Item = Packet>) -> Vec<Packet> {
    packets
        .into_iter()
        .filter(|p| p.position.is_some_and(|fix| fix.is_gps()))
        .collect()
}

/// Sort log packets by the device `when` field, treating a missing value as 0.
pub fn sort_by_when(packets: &mut [Packet]) {
    packets.sort_by_key(|p| p.when.unwrap_or(0));
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use time::macros::datetime;

    fn packet(file: &str, received: f64, location: Option<&str>) -> Packet {
        let mut event = json!({
            "file": file,
            "received": received,
            "body": {}
        });
        if let Some(kind) = location {
            event["best_lon"] = json!(10.0);
            event["best_lat"] = json!(60.0);
            event["best_location_type"] = json!(kind);
        }
        if file == sfy_types::HEALTH_FILE {
            event["body"] = json!({ "text": "hello" });
        }
        if file == sfy_types::AXL_FILE {
            event["body"] = json!({
                "timestamp": (received * 1000.0) as i64,
                "x": [0.0], "y": [0.0], "z": [9.8]
            });
        }
        Packet::from_json(format!("{received}"), &event.to_string()).unwrap()
    }

    #[test]
    fn test_window_is_half_open() {
        let start = datetime!(2024-01-01 0:00 UTC);
        let end = datetime!(2024-01-02 0:00 UTC);
        let w = TimeWindow::new(Some(start), Some(end));

        assert!(w.contains(start));
        assert!(!w.contains(end));
        assert!(w.contains(datetime!(2024-01-01 23:59:59 UTC)));
    }

    #[test]
    fn test_window_open_bounds_as_ms() {
        let w = TimeWindow::unbounded();
        assert_eq!(w.start_ms(), 0);
        assert_eq!(w.end_ms(), i64::MAX);

        let w = TimeWindow::new(Some(datetime!(1970-01-01 0:00:01 UTC)), None);
        assert_eq!(w.start_ms(), 1000);
    }

    #[test]
    fn test_in_window_sorts() {
        let packets = vec![
            packet("axl.qo", 300.0, None),
            packet("axl.qo", 100.0, None),
            packet("axl.qo", 200.0, None),
        ];
        let out = in_window(packets, &TimeWindow::unbounded());
        let times: Vec<i64> = out.iter().map(|p| p.received.unix_timestamp()).collect();
        assert_eq!(times, vec![100, 200, 300]);
    }

    #[test]
    fn test_views_by_kind() {
        let packets = vec![
            packet("axl.qo", 1.0, None),
            packet("health.qo", 2.0, None),
            packet("_track.qo", 3.0, Some("gps")),
        ];
        assert_eq!(axl_only(packets.clone()).len(), 1);
        assert_eq!(health_only(packets.clone()).len(), 1);
        assert_eq!(with_position(packets).len(), 1);
    }

    #[test]
    fn test_gps_only_keeps_order() {
        let packets = vec![
            packet("_track.qo", 1.0, Some("gps")),
            packet("_track.qo", 2.0, Some("tower")),
            packet("_track.qo", 3.0, Some("gps")),
            packet("_track.qo", 4.0, Some("triangulated")),
        ];
        let all = with_position(packets);
        assert_eq!(all.len(), 4);

        let gps = gps_only(all.clone());
        let times: Vec<i64> = gps.iter().map(|p| p.received.unix_timestamp()).collect();
        assert_eq!(times, vec![1, 3]);
    }

    #[test]
    fn test_sort_by_when_missing_first() {
        let mut a = packet("health.qo", 1.0, None);
        a.when = Some(50);
        let b = packet("health.qo", 2.0, None);
        let mut c = packet("health.qo", 3.0, None);
        c.when = Some(10);

        let mut packets = vec![a, b, c];
        sort_by_when(&mut packets);
        let whens: Vec<Option<i64>> = packets.iter().map(|p| p.when).collect();
        assert_eq!(whens, vec![None, Some(10), Some(50)]);
    }

    proptest! {
        #[test]
        fn prop_in_window_is_exact_sorted_subset(
            times in proptest::collection::vec(0u32..10_000, 0..60),
            start in proptest::option::of(0u32..10_000),
            end in proptest::option::of(0u32..10_000),
        ) {
            let packets: Vec<Packet> = times
                .iter()
                .map(|t| packet("health.qo", f64::from(*t), None))
                .collect();
            let to_dt = |s: u32| OffsetDateTime::from_unix_timestamp(i64::from(s)).unwrap();
            let window = TimeWindow::new(start.map(to_dt), end.map(to_dt));

            let out = in_window(packets, &window);

            let expected = times
                .iter()
                .filter(|t| start.is_none_or(|s| **t >= s) && end.is_none_or(|e| **t < e))
                .count();
            prop_assert_eq!(out.len(), expected);
            prop_assert!(out.windows(2).all(|w| w[0].received <= w[1].received));
            prop_assert!(out.iter().all(|p| window.contains(p.received)));
        }
    }
}
