//! Semver version handling for toolchain matching.

use std::sync::LazyLock;

use regex::Regex;
use semver::{Comparator, Op, Version, VersionReq};

static VERSION_DIGITS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)(?:\.(\d+))?(?:\.(\d+))?").expect("version pattern is valid")
});

/// Anything carrying a version, such as a catalog entry.
pub trait Versioned {
    /// The entry's version.
    fn version(&self) -> &Version;
}

impl Versioned for Version {
    fn version(&self) -> &Version {
        self
    }
}

/// Coerce an arbitrary string into a version.
///
/// Takes the first `major[.minor[.patch]]` run of digits, so `B4.90`
/// becomes `4.90.0` and `4.9.3.144` becomes `4.9.3`.
pub fn coerce_version(s: &str) -> Option<Version> {
    let caps = VERSION_DIGITS.captures(s)?;
    let part = |i: usize| -> Option<u64> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };
    Some(Version::new(part(1)?, part(2)?, part(3)?))
}

/// Parse a version, falling back to `0.0.0` with a warning.
///
/// Catalog entries always carry a version so matching never has to deal
/// with a missing one.
pub fn version_or_default(raw: &str, what: &str) -> Version {
    coerce_version(raw).unwrap_or_else(|| {
        tracing::warn!("Could not parse version of {} from `{}`, using 0.0.0", what, raw);
        Version::new(0, 0, 0)
    })
}

/// The `major.minor.x` range around a version.
pub fn minor_range(version: &Version) -> VersionReq {
    VersionReq {
        comparators: vec![Comparator {
            op: Op::Tilde,
            major: version.major,
            minor: Some(version.minor),
            patch: None,
            pre: semver::Prerelease::EMPTY,
        }],
    }
}

/// Sort entries newest first.
pub fn sort_newest_first<T: Versioned>(entries: &mut [T]) {
    entries.sort_by(|a, b| b.version().cmp(a.version()));
}

/// Entry with the highest version.
pub fn highest<T: Versioned>(entries: &[T]) -> Option<&T> {
    entries.iter().max_by(|a, b| a.version().cmp(b.version()))
}

/// Pick the catalog entry best matching a requested version.
///
/// - No entries: no match.
/// - No request: the highest version.
/// - Otherwise the first entry in the `major.minor.x` range of the request.
/// - Nothing in range: the highest version, or no match when `strict`.
pub fn request_version<'a, T: Versioned>(
    entries: &'a [T],
    requested: Option<&str>,
    strict: bool,
) -> Option<&'a T> {
    if entries.is_empty() {
        return None;
    }

    let Some(requested) = requested.map(str::trim).filter(|s| !s.is_empty()) else {
        return highest(entries);
    };

    let Some(version) = coerce_version(requested) else {
        tracing::debug!("Requested version `{}` is not a version", requested);
        return if strict { None } else { highest(entries) };
    };

    let range = minor_range(&version);
    if let Some(found) = entries.iter().find(|e| range.matches(e.version())) {
        return Some(found);
    }

    if strict {
        None
    } else {
        tracing::debug!(
            "No installation matches {}, falling back to the newest available",
            range
        );
        highest(entries)
    }
}
