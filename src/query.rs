// Copyright (c) The release-trends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query and export functionality over persisted snapshot history.

use crate::classify::AssetClassifier;
use crate::config::Config;
use crate::derive::{self, DerivedRow};
use crate::select;
use crate::store::Store;
use anyhow::{Context, Result};
use camino::Utf8Path;
use std::{fs::File, io::Write};

pub enum QueryKind {
    Latest,
    Versions { repository: String },
}

pub enum ExportKind {
    Csv { repository: String, output: String },
    Json { repository: String, output: String },
}

pub fn run_query(store: &Store, config: &Config, query: QueryKind) -> Result<()> {
    match query {
        QueryKind::Latest => query_latest(store)?,
        QueryKind::Versions { repository } => query_versions(store, config, &repository)?,
    }
    Ok(())
}

pub fn run_export(store: &Store, config: &Config, export: ExportKind) -> Result<()> {
    match export {
        ExportKind::Csv { repository, output } => {
            let rows = derive_repository(store, config, &repository)?;
            export_csv(&rows, output.as_ref())?;
        }
        ExportKind::Json { repository, output } => {
            let rows = derive_repository(store, config, &repository)?;
            export_json(&rows, output.as_ref())?;
        }
    }
    Ok(())
}

/// Load and derive one repository's trend table.
pub fn derive_repository(
    store: &Store,
    config: &Config,
    repository: &str,
) -> Result<Vec<DerivedRow>> {
    let source = config
        .repository(repository)
        .with_context(|| format!("repository '{}' is not configured", repository))?;

    let history = store
        .history(repository)
        .with_context(|| format!("failed to load history for '{}'", repository))?;

    let classifier = AssetClassifier::new(source.product.as_str());
    Ok(derive::derive(&classifier, &history))
}

fn query_latest(store: &Store) -> Result<()> {
    let Some(latest) = store.latest_snapshot_date()? else {
        println!("No snapshots recorded yet.");
        return Ok(());
    };

    println!("\nLatest snapshot: {}", latest);
    println!("\n{:<24} {:>8} {:>15}", "Repository", "Assets", "Downloads");
    println!("{}", "=".repeat(49));

    for repository in store.repositories()? {
        let history = store.history(&repository)?;
        let latest_rows: Vec<_> = history.iter().filter(|o| o.date == latest).collect();
        let total: u64 = latest_rows.iter().map(|o| o.download_count).sum();
        println!(
            "{:<24} {:>8} {:>15}",
            repository,
            latest_rows.len(),
            format_number(total)
        );
    }

    Ok(())
}

fn query_versions(store: &Store, config: &Config, repository: &str) -> Result<()> {
    let rows = derive_repository(store, config, repository)?;
    let totals = version_totals(&rows);

    if totals.is_empty() {
        println!("No classified assets for '{}'.", repository);
        return Ok(());
    }

    println!("\n{:<10} {:>15}", "Version", "Downloads");
    println!("{}", "=".repeat(26));

    for (version, total) in totals {
        println!("{:<10} {:>15}", version.to_string(), format_number(total));
    }

    Ok(())
}

/// Last known cumulative totals per version, newest version first.
///
/// Each version's total is taken at that version's own latest date: a
/// version whose assets stopped appearing in recent snapshots still reports
/// its last known count rather than zero.
fn version_totals(rows: &[DerivedRow]) -> Vec<(crate::classify::ProductVersion, u64)> {
    select::distinct_versions(rows)
        .into_iter()
        .map(|version| {
            let latest = rows
                .iter()
                .filter(|r| r.version == version)
                .map(|r| r.date)
                .max();
            let total = rows
                .iter()
                .filter(|r| r.version == version && Some(r.date) == latest)
                .map(|r| r.download_count)
                .sum();
            (version, total)
        })
        .collect()
}

const EXPORT_COLUMNS: [&str; 6] = [
    "date",
    "version",
    "platform",
    "download_count",
    "download_count_diff",
    "smoothed_rate",
];

fn export_csv(rows: &[DerivedRow], output: &Utf8Path) -> Result<()> {
    let mut file = File::create(output.as_std_path())
        .with_context(|| format!("failed to create file at {}", output))?;

    writeln!(file, "{}", EXPORT_COLUMNS.join(","))?;

    for row in rows {
        // Undefined diff/rate export as empty cells, matching how they
        // render as gaps.
        let diff = row
            .download_count_diff
            .map(|d| d.to_string())
            .unwrap_or_default();
        let rate = row.smoothed_rate.map(|r| r.to_string()).unwrap_or_default();
        writeln!(
            file,
            "{},{},{},{},{},{}",
            row.date, row.version, row.platform, row.download_count, diff, rate
        )?;
    }

    println!("Exported to {}.", output);
    Ok(())
}

fn export_json(rows: &[DerivedRow], output: &Utf8Path) -> Result<()> {
    let records: Vec<serde_json::Value> = rows
        .iter()
        .map(|row| {
            serde_json::json!({
                "date": row.date.to_string(),
                "version": row.version.to_string(),
                "platform": row.platform.as_str(),
                "download_count": row.download_count,
                "download_count_diff": row.download_count_diff,
                "smoothed_rate": row.smoothed_rate,
            })
        })
        .collect();

    let json = serde_json::to_string_pretty(&records)?;

    let mut file = File::create(output.as_std_path())
        .with_context(|| format!("failed to create file at {}", output))?;
    file.write_all(json.as_bytes())?;

    println!("Exported to {}.", output);
    Ok(())
}

/// Format a number with thousands separators.
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}
