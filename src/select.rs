// Copyright (c) The release-trends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Selection of which version groups participate in a rendering pass.

use crate::classify::{Platform, ProductVersion};
use crate::derive::DerivedRow;
use std::collections::BTreeSet;

/// Distinct versions present in the derived rows, newest first. Ordering is
/// numeric on `(major, minor)`, so `1.10` sorts above `1.9`.
pub fn distinct_versions(rows: &[DerivedRow]) -> Vec<ProductVersion> {
    let versions: BTreeSet<ProductVersion> = rows.iter().map(|r| r.version).collect();
    versions.into_iter().rev().collect()
}

/// Distinct platforms present in the derived rows, in label order, for
/// consistent hue assignment across charts.
pub fn distinct_platforms(rows: &[DerivedRow]) -> Vec<Platform> {
    let platforms: BTreeSet<Platform> = rows.iter().map(|r| r.platform).collect();
    platforms.into_iter().collect()
}

/// Keep only rows belonging to the newest `n` versions. If fewer than `n`
/// distinct versions exist, everything is kept.
pub fn select_latest(rows: Vec<DerivedRow>, n: usize) -> Vec<DerivedRow> {
    let latest: BTreeSet<ProductVersion> =
        distinct_versions(&rows).into_iter().take(n).collect();
    rows.into_iter()
        .filter(|r| latest.contains(&r.version))
        .collect()
}

/// The identity selection, used for the "all versions" view.
pub fn select_all(rows: Vec<DerivedRow>) -> Vec<DerivedRow> {
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(version: ProductVersion, platform: Platform) -> DerivedRow {
        DerivedRow {
            date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            version,
            platform,
            download_count: 0,
            download_count_diff: None,
            smoothed_rate: None,
        }
    }

    fn sample_rows() -> Vec<DerivedRow> {
        vec![
            row(ProductVersion::new(1, 9), Platform::Linux),
            row(ProductVersion::new(1, 10), Platform::Macos),
            row(ProductVersion::new(2, 0), Platform::Windows),
            row(ProductVersion::new(1, 10), Platform::Linux),
        ]
    }

    #[test]
    fn test_versions_order_numerically_descending() {
        assert_eq!(
            distinct_versions(&sample_rows()),
            vec![
                ProductVersion::new(2, 0),
                ProductVersion::new(1, 10),
                ProductVersion::new(1, 9),
            ]
        );
    }

    #[test]
    fn test_select_latest_keeps_top_n() {
        let selected = select_latest(sample_rows(), 2);
        let versions = distinct_versions(&selected);
        // 1.10 beats 1.9 numerically, despite lexicographic order.
        assert_eq!(
            versions,
            vec![ProductVersion::new(2, 0), ProductVersion::new(1, 10)]
        );
        assert_eq!(selected.len(), 3);
    }

    #[test]
    fn test_select_latest_with_oversized_n() {
        let selected = select_latest(sample_rows(), 10);
        assert_eq!(selected.len(), 4);
    }

    #[test]
    fn test_select_all_is_identity() {
        assert_eq!(select_all(sample_rows()), sample_rows());
    }

    #[test]
    fn test_platforms_in_label_order() {
        assert_eq!(
            distinct_platforms(&sample_rows()),
            vec![Platform::Linux, Platform::Macos, Platform::Windows]
        );
    }
}
