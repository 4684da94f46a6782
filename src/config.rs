// Copyright (c) The release-trends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for release download tracking.

use anyhow::{Context, Result};
use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub repository: Vec<RepositorySource>,

    #[serde(default)]
    pub charts: ChartsConfig,
}

/// A tracked GitHub repository and the product family whose assets it ships.
#[derive(Debug, Deserialize, Serialize)]
pub struct RepositorySource {
    pub owner: String,
    pub name: String,
    /// Asset name prefix identifying the tracked product; assets with a
    /// different prefix are ignored.
    pub product: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ChartsConfig {
    /// How many of the newest versions the "latest-N" chart covers.
    #[serde(default = "default_latest")]
    pub latest: usize,

    /// Facet columns per row in the "all versions" chart.
    #[serde(default = "default_facet_columns")]
    pub facet_columns: usize,
}

fn default_latest() -> usize {
    3
}

fn default_facet_columns() -> usize {
    5
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            latest: default_latest(),
            facet_columns: default_facet_columns(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let content = fs::read_to_string(path.as_std_path())
            .with_context(|| format!("failed to read config file at {}", path))?;

        toml::from_str(&content)
            .with_context(|| format!("failed to parse config file at {}", path))
    }

    /// Find the source entry for a repository name, if configured.
    pub fn repository(&self, name: &str) -> Option<&RepositorySource> {
        self.repository.iter().find(|r| r.name == name)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repository: vec![RepositorySource {
                owner: "pupil-labs".to_string(),
                name: "pupil".to_string(),
                product: "pupil".to_string(),
            }],
            charts: ChartsConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();

        assert_eq!(config.repository.len(), parsed.repository.len());
        assert_eq!(config.charts.latest, parsed.charts.latest);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[[repository]]
owner = "pupil-labs"
name = "pupil"
product = "pupil"

[[repository]]
owner = "pupil-labs"
name = "pupil-cloud"
product = "cloud"

[charts]
latest = 2
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.repository.len(), 2);
        assert_eq!(config.repository("pupil").unwrap().owner, "pupil-labs");
        assert_eq!(config.repository("pupil-cloud").unwrap().product, "cloud");
        assert!(config.repository("missing").is_none());

        assert_eq!(config.charts.latest, 2);
        // Unset fields fall back to their defaults.
        assert_eq!(config.charts.facet_columns, 5);
    }
}
