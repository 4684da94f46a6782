// Copyright (c) The release-trends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CLI argument parsing and command dispatch.

use crate::{commands, config, query};
use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the SQLite snapshot database
    #[arg(short, long, default_value = "release-trends.db", global = true)]
    database: Utf8PathBuf,

    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: Utf8PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser, Debug)]
enum Command {
    /// Collect a release download snapshot for all configured repositories
    Collect,

    /// Render trend charts from collected snapshots
    Charts {
        /// Output directory for chart images
        #[arg(short, long, default_value = "visualizations")]
        output: Utf8PathBuf,
    },

    /// Query collected statistics
    Query {
        #[command(subcommand)]
        query_type: QueryType,
    },

    /// Export a repository's derived trend table
    Export {
        #[command(subcommand)]
        export_type: ExportType,
    },
}

#[derive(Parser, Debug)]
enum QueryType {
    /// Show the latest snapshot's totals per repository
    Latest,

    /// Show distinct versions for a repository, newest first
    Versions {
        /// Repository to inspect
        #[arg(short, long)]
        repository: String,
    },
}

#[derive(Parser, Debug)]
enum ExportType {
    /// Export to CSV format
    Csv {
        /// Repository to export
        #[arg(short, long)]
        repository: String,

        /// Output file path
        #[arg(short, long)]
        output: Utf8PathBuf,
    },

    /// Export to JSON format
    Json {
        /// Repository to export
        #[arg(short, long)]
        repository: String,

        /// Output file path
        #[arg(short, long)]
        output: Utf8PathBuf,
    },
}

/// Parse arguments and dispatch to the appropriate command.
pub async fn dispatch() -> Result<()> {
    let args = Args::parse();
    let config = config::Config::load(&args.config).context("failed to load configuration")?;

    match args.command {
        Command::Collect => {
            commands::run_collect(&args.database, &config).await?;
        }
        Command::Charts { output } => {
            commands::run_charts(&args.database, &config, &output)?;
        }
        Command::Query { query_type } => {
            let kind = match query_type {
                QueryType::Latest => query::QueryKind::Latest,
                QueryType::Versions { repository } => query::QueryKind::Versions { repository },
            };
            commands::run_query(&args.database, &config, kind)?;
        }
        Command::Export { export_type } => {
            let kind = match export_type {
                ExportType::Csv { repository, output } => query::ExportKind::Csv {
                    repository,
                    output: output.to_string(),
                },
                ExportType::Json { repository, output } => query::ExportKind::Json {
                    repository,
                    output: output.to_string(),
                },
            };
            commands::run_export(&args.database, &config, kind)?;
        }
    }

    Ok(())
}
