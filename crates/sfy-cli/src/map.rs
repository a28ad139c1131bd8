//! Track map rendering.
//!
//! Positions are drawn on plain longitude/latitude axes (Plate Carrée) into
//! an SVG document.

use std::ops::Range;

use anyhow::{Result, bail};
use plotters::prelude::*;
use sfy_types::Packet;

/// Size of the rendered map in pixels.
const MAP_SIZE: (u32, u32) = (1024, 768);

/// Extent used when all positions share a coordinate, in degrees.
const MIN_EXTENT: f64 = 0.01;

const TRACK_COLOR: RGBColor = RGBColor(31, 119, 180);

/// `(lon, lat)` of every packet with a position fix.
pub fn track_points(packets: &[Packet]) -> Vec<(f64, f64)> {
    packets
        .iter()
        .filter_map(|p| p.position.map(|pos| (pos.lon, pos.lat)))
        .collect()
}

fn padded(values: impl Iterator<Item = f64> + Clone, margin: f64) -> Range<f64> {
    let min = values.clone().fold(f64::INFINITY, f64::min);
    let max = values.fold(f64::NEG_INFINITY, f64::max);
    let extent = (max - min).max(MIN_EXTENT);
    let center = (min + max) / 2.0;
    let half = extent * (0.5 + margin);
    (center - half)..(center + half)
}

/// Axis ranges around `points`, padded by `margins` as a fraction of the extent.
pub fn map_bounds(points: &[(f64, f64)], margins: (f64, f64)) -> (Range<f64>, Range<f64>) {
    let lon = padded(points.iter().map(|p| p.0), margins.0);
    let lat = padded(points.iter().map(|p| p.1), margins.1);
    (lon, lat)
}

/// Render the track of `dev` as an SVG document.
///
/// With `fast` set only the line is drawn, without a marker per position.
pub fn render_track_svg(
    dev: &str,
    points: &[(f64, f64)],
    margins: (f64, f64),
    fast: bool,
) -> Result<String> {
    if points.is_empty() {
        bail!("No positions found for {}", dev);
    }

    let (lon, lat) = map_bounds(points, margins);
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, MAP_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(format!("Track of {}", dev), ("sans-serif", 24))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(lon, lat)?;

        chart
            .configure_mesh()
            .x_desc("Longitude")
            .y_desc("Latitude")
            .draw()?;

        chart
            .draw_series(LineSeries::new(points.iter().copied(), &TRACK_COLOR))?
            .label(dev)
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], TRACK_COLOR));

        if !fast {
            chart.draw_series(
                points
                    .iter()
                    .map(|&p| Circle::new(p, 3, TRACK_COLOR.filled())),
            )?;
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
    }
    Ok(svg)
}
