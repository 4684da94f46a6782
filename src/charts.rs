// Copyright (c) The release-trends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chart generation for download trend visualization.
//!
//! Each repository renders as faceted line charts: one facet per version
//! (newest first), one line per platform, y = smoothed downloads per day.
//! Rows with an undefined rate are gaps, not zeros.

use crate::classify::Platform;
use crate::config::ChartsConfig;
use crate::derive::DerivedRow;
use crate::select::{self, select_all, select_latest};
use anyhow::{Context, Result};
use camino::Utf8Path;
use chrono::NaiveDate;
use plotters::prelude::*;

const FACET_WIDTH: u32 = 420;
const FACET_HEIGHT: u32 = 360;

// Typography - Inter font family
const FONT_FAMILY: &str = "Inter";
const TITLE_SIZE: i32 = 20;
const LABEL_SIZE: i32 = 14;
const AXIS_SIZE: i32 = 12;

// Colors - Modern, minimal palette
const BACKGROUND: RGBColor = RGBColor(250, 250, 252); // Off-white
const TEXT_PRIMARY: RGBColor = RGBColor(15, 23, 42); // Slate 900
const TEXT_SECONDARY: RGBColor = RGBColor(100, 116, 139); // Slate 500
const GRID_COLOR: RGBColor = RGBColor(226, 232, 240); // Slate 200

/// Fixed hue per platform, stable across charts regardless of which
/// platforms a particular repository ships.
fn platform_color(platform: Platform) -> RGBColor {
    match platform {
        Platform::Linux => RGBColor(59, 130, 246),   // Blue 500
        Platform::Macos => RGBColor(34, 197, 94),    // Green 500
        Platform::Windows => RGBColor(251, 146, 60), // Orange 400
    }
}

/// Render the three artifacts for one repository: all versions, the newest
/// N versions, and the newest version alone.
pub fn render_repository(
    rows: &[DerivedRow],
    repository: &str,
    config: &ChartsConfig,
    output_dir: &Utf8Path,
) -> Result<()> {
    std::fs::create_dir_all(output_dir.as_std_path())
        .with_context(|| format!("failed to create output directory at {}", output_dir))?;

    let all = output_dir.join(format!("{repository}.all.png"));
    render_faceted(
        &select_all(rows.to_vec()),
        &all,
        config.facet_columns,
    )?;

    let latest_n = output_dir.join(format!("{repository}.latest-{}.png", config.latest));
    render_faceted(
        &select_latest(rows.to_vec(), config.latest),
        &latest_n,
        config.latest,
    )?;

    let latest = output_dir.join(format!("{repository}.latest.png"));
    render_faceted(&select_latest(rows.to_vec(), 1), &latest, 1)?;

    Ok(())
}

/// Render one faceted chart, wrapping facets at `columns` per row.
fn render_faceted(rows: &[DerivedRow], output_path: &Utf8Path, columns: usize) -> Result<()> {
    let versions = select::distinct_versions(rows);
    let platforms = select::distinct_platforms(rows);

    // Points without a defined rate never render; if nothing has one yet
    // (e.g. a single snapshot so far) there is no chart to draw.
    let rated: Vec<&DerivedRow> = rows.iter().filter(|r| r.smoothed_rate.is_some()).collect();
    if rated.is_empty() {
        return Ok(());
    }

    let min_date = rated.iter().map(|r| r.date).min().unwrap();
    let mut max_date = rated.iter().map(|r| r.date).max().unwrap();
    if max_date == min_date {
        // A degenerate axis range confuses plotters; widen it by a day.
        max_date = max_date + chrono::Duration::days(1);
    }

    let rates = rated.iter().filter_map(|r| r.smoothed_rate);
    let y_min = rates.clone().fold(0.0f64, f64::min);
    let y_max = rates.fold(1.0f64, f64::max);

    let columns = columns.clamp(1, versions.len());
    let facet_rows = versions.len().div_ceil(columns);

    let width = FACET_WIDTH * columns as u32;
    let height = FACET_HEIGHT * facet_rows as u32;

    let root =
        BitMapBackend::new(output_path.as_std_path(), (width, height)).into_drawing_area();
    root.fill(&BACKGROUND)?;

    let areas = root.split_evenly((facet_rows, columns));

    for (facet_idx, (version, area)) in versions.iter().zip(areas.iter()).enumerate() {
        let mut chart = ChartBuilder::on(area)
            .caption(
                format!("version {version}"),
                (FONT_FAMILY, TITLE_SIZE).into_font().color(&TEXT_PRIMARY),
            )
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(min_date..max_date, y_min..y_max)?;

        chart
            .configure_mesh()
            .bold_line_style(&GRID_COLOR.mix(0.3))
            .light_line_style(&TRANSPARENT)
            .x_labels(5)
            .y_labels(5)
            .x_label_style((FONT_FAMILY, AXIS_SIZE).into_font().color(&TEXT_SECONDARY))
            .y_label_style((FONT_FAMILY, AXIS_SIZE).into_font().color(&TEXT_SECONDARY))
            .x_label_formatter(&|date| date.format("%m-%d").to_string())
            .y_label_formatter(&|y| format!("{y:.0}"))
            .disable_x_mesh()
            .draw()?;

        for &platform in &platforms {
            let series: Vec<(NaiveDate, f64)> = rows
                .iter()
                .filter(|r| r.version == *version && r.platform == platform)
                .filter_map(|r| r.smoothed_rate.map(|rate| (r.date, rate)))
                .collect();

            if series.is_empty() {
                continue;
            }

            let color = platform_color(platform);
            chart
                .draw_series(LineSeries::new(
                    series.into_iter(),
                    ShapeStyle {
                        color: color.to_rgba(),
                        filled: true,
                        stroke_width: 2,
                    },
                ))?
                .label(platform.as_str())
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled())
                });
        }

        // One legend for the whole grid; every facet shares the hues.
        if facet_idx == 0 {
            chart
                .configure_series_labels()
                .label_font((FONT_FAMILY, LABEL_SIZE).into_font().color(&TEXT_PRIMARY))
                .background_style(&BACKGROUND)
                .border_style(&GRID_COLOR)
                .margin(10)
                .draw()?;
        }
    }

    root.present()?;
    println!("  • {}", output_path.file_name().unwrap_or_default());
    Ok(())
}
