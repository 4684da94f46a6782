// Copyright (c) The release-trends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Derivation of daily deltas and smoothed rates from cumulative history.
//!
//! Derivation is a pure read-side computation over raw history: nothing here
//! is persisted, and re-running it over the same history yields the same
//! rows.

use crate::classify::{AssetClassifier, Platform, ProductVersion};
use crate::store::Observation;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Trailing window for rate smoothing, in calendar days. The window is
/// `[date - 7 days, date]` inclusive, over dates actually present in the
/// group's series, not a fixed row count.
const SMOOTHING_WINDOW_DAYS: i64 = 7;

/// One derived point per `(date, version, platform)` group.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRow {
    pub date: NaiveDate,
    pub version: ProductVersion,
    pub platform: Platform,
    /// Cumulative downloads, summed over all assets in the group.
    pub download_count: u64,
    /// This date's count minus the group's previous date's count. `None` for
    /// the first observation in a group. Negative when an upstream count
    /// decreased (asset removed or renamed); deliberately not clamped.
    pub download_count_diff: Option<i64>,
    /// Mean of the defined diffs in the trailing window, or `None` when the
    /// window holds none (first point, or a single-point group).
    pub smoothed_rate: Option<f64>,
}

/// Classify raw history and compute per-group diffs and smoothed rates.
///
/// Rows whose asset name is rejected by the classifier are dropped. Groups
/// never influence each other: diffs and windows are computed strictly
/// within one `(version, platform)` partition, ordered by date ascending.
/// Output is ordered by `(version, platform, date)` ascending.
pub fn derive(classifier: &AssetClassifier, history: &[Observation]) -> Vec<DerivedRow> {
    // Partition by group, summing counts of assets that share a group on the
    // same date (e.g. an rc build and the final build of one version).
    let mut groups: BTreeMap<(ProductVersion, Platform), BTreeMap<NaiveDate, u64>> =
        BTreeMap::new();

    for obs in history {
        let Some(classified) = classifier.classify(&obs.asset) else {
            continue;
        };
        *groups
            .entry((classified.version, classified.platform))
            .or_default()
            .entry(obs.date)
            .or_default() += obs.download_count;
    }

    let mut derived = Vec::new();
    for ((version, platform), series) in groups {
        derive_group(version, platform, &series, &mut derived);
    }
    derived
}

/// Diff and smooth one group's date-ordered series.
fn derive_group(
    version: ProductVersion,
    platform: Platform,
    series: &BTreeMap<NaiveDate, u64>,
    out: &mut Vec<DerivedRow>,
) {
    let points: Vec<(NaiveDate, u64)> = series.iter().map(|(d, c)| (*d, *c)).collect();

    let diffs: Vec<Option<i64>> = points
        .iter()
        .enumerate()
        .map(|(i, (_, count))| {
            (i > 0).then(|| *count as i64 - points[i - 1].1 as i64)
        })
        .collect();

    for (i, (date, count)) in points.iter().enumerate() {
        let window_start = *date - chrono::Duration::days(SMOOTHING_WINDOW_DAYS);

        let mut sum = 0i64;
        let mut n = 0u32;
        for (j, (d, _)) in points[..=i].iter().enumerate() {
            if *d >= window_start
                && let Some(diff) = diffs[j]
            {
                sum += diff;
                n += 1;
            }
        }

        out.push(DerivedRow {
            date: *date,
            version,
            platform,
            download_count: *count,
            download_count_diff: diffs[i],
            smoothed_rate: (n > 0).then(|| sum as f64 / n as f64),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> AssetClassifier {
        AssetClassifier::new("pupil")
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, d).unwrap()
    }

    fn obs(d: u32, asset: &str, count: u64) -> Observation {
        Observation {
            date: day(d),
            asset: asset.to_string(),
            download_count: count,
        }
    }

    fn linux_series(counts: &[u64]) -> Vec<Observation> {
        counts
            .iter()
            .enumerate()
            .map(|(i, c)| obs(i as u32 + 1, "pupil_1.0.0_linux_x64", *c))
            .collect()
    }

    #[test]
    fn test_first_point_has_no_diff() {
        let rows = derive(&classifier(), &linux_series(&[100, 110]));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].download_count_diff, None);
        assert_eq!(rows[0].smoothed_rate, None);
        assert_eq!(rows[1].download_count_diff, Some(10));
        assert_eq!(rows[1].smoothed_rate, Some(10.0));
    }

    #[test]
    fn test_rolling_window_is_calendar_based() {
        // Daily points on days 1..10 with diffs [_, 1, 2, ..., 9].
        let counts: Vec<u64> = (0..10).map(|i| (i * (i + 1) / 2) as u64).collect();
        let rows = derive(&classifier(), &linux_series(&counts));

        // Day 8's window is days 1..8; only days 2..8 carry diffs 1..7.
        let day8 = rows.iter().find(|r| r.date == day(8)).unwrap();
        let expected = (1..=7).sum::<i64>() as f64 / 7.0;
        assert_eq!(day8.smoothed_rate, Some(expected));

        // Day 10's window is days 3..10, all with diffs (2..9).
        let day10 = rows.iter().find(|r| r.date == day(10)).unwrap();
        let expected = (2..=9).sum::<i64>() as f64 / 8.0;
        assert_eq!(day10.smoothed_rate, Some(expected));
    }

    #[test]
    fn test_window_respects_gaps_in_sampling() {
        // Points on days 1, 2, and 12: day 12's window reaches back only to
        // day 5, so it holds no defined diff besides its own.
        let history = vec![
            obs(1, "pupil_1.0.0_linux_x64", 100),
            obs(2, "pupil_1.0.0_linux_x64", 110),
            obs(12, "pupil_1.0.0_linux_x64", 150),
        ];
        let rows = derive(&classifier(), &history);

        let day12 = rows.iter().find(|r| r.date == day(12)).unwrap();
        assert_eq!(day12.download_count_diff, Some(40));
        assert_eq!(day12.smoothed_rate, Some(40.0));
    }

    #[test]
    fn test_negative_diff_passes_through() {
        let rows = derive(&classifier(), &linux_series(&[100, 90]));
        assert_eq!(rows[1].download_count_diff, Some(-10));
        assert_eq!(rows[1].smoothed_rate, Some(-10.0));
    }

    #[test]
    fn test_single_point_group_does_not_panic() {
        let rows = derive(&classifier(), &linux_series(&[100]));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].download_count_diff, None);
        assert_eq!(rows[0].smoothed_rate, None);
    }

    #[test]
    fn test_groups_are_independent() {
        let mut history = linux_series(&[100, 110]);
        let rows_before = derive(&classifier(), &history);

        // Adding another group's data must not change the linux group's diffs.
        history.push(obs(1, "pupil_1.0.0_macos_x64", 7000));
        history.push(obs(2, "pupil_1.0.0_macos_x64", 9000));
        history.push(obs(1, "pupil_2.0.0_linux_x64", 1));
        let rows_after = derive(&classifier(), &history);

        let linux_10 = |rows: &[DerivedRow]| -> Vec<DerivedRow> {
            rows.iter()
                .filter(|r| {
                    r.version == ProductVersion::new(1, 0) && r.platform == Platform::Linux
                })
                .cloned()
                .collect()
        };
        assert_eq!(linux_10(&rows_before), linux_10(&rows_after));
    }

    #[test]
    fn test_assets_in_same_group_are_summed() {
        // An rc build and the final build both map to group (1.0, linux).
        let history = vec![
            obs(1, "pupil_1.0.0-rc1_linux_x64", 30),
            obs(1, "pupil_1.0.0_linux_x64", 70),
            obs(2, "pupil_1.0.0-rc1_linux_x64", 35),
            obs(2, "pupil_1.0.0_linux_x64", 85),
        ];
        let rows = derive(&classifier(), &history);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].download_count, 100);
        assert_eq!(rows[1].download_count, 120);
        assert_eq!(rows[1].download_count_diff, Some(20));
    }

    #[test]
    fn test_unclassifiable_assets_are_dropped() {
        let history = vec![
            obs(1, "pupil_1.0.0_linux_x64", 100),
            obs(1, "checksums.txt", 50),
            obs(1, "other_1.0.0_linux_x64", 50),
        ];
        let rows = derive(&classifier(), &history);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].download_count, 100);
    }
}
