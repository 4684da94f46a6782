// Copyright (c) The release-trends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command implementations.

use crate::config::Config;
use crate::store::Store;
use crate::{charts, github, query};
use anyhow::{Context, Result};
use camino::Utf8Path;
use chrono::Utc;

/// Run the collect command: fetch a snapshot for every configured
/// repository and merge it into the store.
///
/// A failure for one repository is reported and does not abort the others;
/// the command fails at the end if any repository failed.
pub async fn run_collect(database: &Utf8Path, config: &Config) -> Result<()> {
    println!("Opening snapshot store at {}", database);
    let mut store = Store::open(database)
        .with_context(|| format!("failed to open snapshot store at {}", database))?;

    let today = Utc::now().date_naive();
    let mut failures = 0;

    println!("\nCollecting release snapshots for {}...", today);
    for source in &config.repository {
        println!("  {}/{}", source.owner, source.name);
        if let Err(error) = collect_repository(&mut store, &source.owner, &source.name, today).await
        {
            eprintln!("  failed to collect {}: {:#}", source.name, error);
            failures += 1;
        }
    }

    if failures > 0 {
        anyhow::bail!("collection failed for {} repositories", failures);
    }

    println!("\nCollection complete.");
    Ok(())
}

async fn collect_repository(
    store: &mut Store,
    owner: &str,
    repository: &str,
    today: chrono::NaiveDate,
) -> Result<()> {
    let releases = github::fetch_releases(owner, repository)
        .await
        .context("failed to fetch GitHub releases")?;

    println!("  Found {} releases", releases.len());

    let batch = github::flatten_assets(releases);
    let total_downloads: u64 = batch.iter().map(|(_, count)| count).sum();
    let asset_count = batch.len();

    let history = store
        .merge(repository, today, &batch)
        .context("failed to merge snapshot into store")?;

    println!(
        "  Recorded {} assets with {} total downloads ({} history rows)",
        asset_count,
        total_downloads,
        history.len()
    );
    Ok(())
}

/// Run the charts command: derive and render trend charts for every
/// repository with persisted history.
pub fn run_charts(database: &Utf8Path, config: &Config, output_dir: &Utf8Path) -> Result<()> {
    let store = Store::open(database)
        .with_context(|| format!("failed to open snapshot store at {}", database))?;

    println!("\nGenerating charts...");
    let mut failures = 0;

    for repository in store.repositories()? {
        if config.repository(&repository).is_none() {
            // History from a repository no longer in the config; skip it
            // rather than guessing a product prefix.
            println!("  {} (not configured, skipped)", repository);
            continue;
        }

        if let Err(error) = render_repository(&store, config, &repository, output_dir) {
            eprintln!("  failed to render {}: {:#}", repository, error);
            failures += 1;
        }
    }

    if failures > 0 {
        anyhow::bail!("chart generation failed for {} repositories", failures);
    }

    println!("  ✓ Charts saved to {}", output_dir);
    Ok(())
}

fn render_repository(
    store: &Store,
    config: &Config,
    repository: &str,
    output_dir: &Utf8Path,
) -> Result<()> {
    let rows = query::derive_repository(store, config, repository)?;
    charts::render_repository(&rows, repository, &config.charts, output_dir)
}

/// Run a query against the store.
pub fn run_query(database: &Utf8Path, config: &Config, kind: query::QueryKind) -> Result<()> {
    let store = Store::open(database)
        .with_context(|| format!("failed to open snapshot store at {}", database))?;
    query::run_query(&store, config, kind)
}

/// Export a repository's derived trend table.
pub fn run_export(database: &Utf8Path, config: &Config, kind: query::ExportKind) -> Result<()> {
    let store = Store::open(database)
        .with_context(|| format!("failed to open snapshot store at {}", database))?;
    query::run_export(&store, config, kind)
}
