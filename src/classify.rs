// Copyright (c) The release-trends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classification of raw release asset names into version/platform groups.
//!
//! Asset names follow a `<product>_<version>_<platform>_...` convention,
//! e.g. `pupil_1.23.4-rc1_linux_x64`. Anything that does not match is not
//! part of the tracked product surface and is silently dropped.

use std::fmt;

/// A product version truncated to `(major, minor)`.
///
/// Patch and pre-release information is discarded for grouping purposes:
/// `1.23.0` and `1.23.4-rc1` both belong to group `1.23`. Ordering is
/// numeric, so `1.10 > 1.9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProductVersion {
    pub major: u64,
    pub minor: u64,
}

impl ProductVersion {
    pub fn new(major: u64, minor: u64) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for ProductVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Recognized build platforms. Variant order is the label order used
/// consistently for chart hues and legends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Platform {
    Linux,
    Macos,
    Windows,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Linux, Platform::Macos, Platform::Windows];

    /// Map a raw platform label to the enum, or `None` for labels outside
    /// the recognized set.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "linux" => Some(Platform::Linux),
            "macos" => Some(Platform::Macos),
            "windows" => Some(Platform::Windows),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Macos => "macos",
            Platform::Windows => "windows",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The structured dimensions extracted from an asset name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedAsset {
    pub version: ProductVersion,
    pub platform: Platform,
}

/// Parses asset names for one product family.
#[derive(Debug, Clone)]
pub struct AssetClassifier {
    product: String,
}

impl AssetClassifier {
    pub fn new(product: impl Into<String>) -> Self {
        Self {
            product: product.into(),
        }
    }

    /// Classify an asset name, or return `None` if it does not belong to
    /// the tracked product surface.
    ///
    /// Malformed names (too few tokens, non-numeric version components,
    /// unknown platform labels) are rejects, not errors; callers filter
    /// them out silently.
    pub fn classify(&self, asset_name: &str) -> Option<ClassifiedAsset> {
        let mut tokens = asset_name.split('_');

        if tokens.next()? != self.product {
            return None;
        }

        // Pre-release tags hang off the version after a hyphen (`1.23.4-rc1`)
        // and are irrelevant to grouping.
        let version_token = tokens.next()?.split('-').next()?;
        let version = parse_major_minor(version_token)?;

        let platform = Platform::parse(tokens.next()?)?;

        Some(ClassifiedAsset { version, platform })
    }
}

/// Parse a version string down to `(major, minor)`.
///
/// Accepts both full semantic versions and bare `major.minor` forms, which
/// some older assets use.
fn parse_major_minor(s: &str) -> Option<ProductVersion> {
    let version = semver::Version::parse(s)
        .ok()
        .or_else(|| semver::Version::parse(&format!("{s}.0")).ok())?;
    Some(ProductVersion::new(version.major, version.minor))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> AssetClassifier {
        AssetClassifier::new("pupil")
    }

    #[test]
    fn test_classify_truncates_version() {
        let classified = classifier().classify("pupil_1.23.4-rc1_linux_x64").unwrap();
        assert_eq!(classified.version, ProductVersion::new(1, 23));
        assert_eq!(classified.platform, Platform::Linux);
    }

    #[test]
    fn test_classify_major_minor_only() {
        let classified = classifier().classify("pupil_1.23_macos_x64").unwrap();
        assert_eq!(classified.version, ProductVersion::new(1, 23));
        assert_eq!(classified.platform, Platform::Macos);
    }

    #[test]
    fn test_rejects_product_mismatch() {
        assert_eq!(classifier().classify("other_1.0.0_linux"), None);
    }

    #[test]
    fn test_rejects_unknown_platform() {
        assert_eq!(classifier().classify("pupil_1.0.0_freebsd_x64"), None);
    }

    #[test]
    fn test_rejects_malformed_names() {
        let classifier = classifier();
        assert_eq!(classifier.classify("pupil"), None);
        assert_eq!(classifier.classify("pupil_1.0.0"), None);
        assert_eq!(classifier.classify("pupil_vnext_linux"), None);
        assert_eq!(classifier.classify(""), None);
    }

    #[test]
    fn test_version_ordering_is_numeric() {
        assert!(ProductVersion::new(1, 10) > ProductVersion::new(1, 9));
        assert!(ProductVersion::new(2, 0) > ProductVersion::new(1, 10));
    }

    #[test]
    fn test_version_display() {
        assert_eq!(ProductVersion::new(1, 23).to_string(), "1.23");
    }
}
