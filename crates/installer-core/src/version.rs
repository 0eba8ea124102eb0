use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^v?(?:(?<epoch>[0-9]+):)?(?<body>[0-9][0-9A-Za-z~_]*(?:[.+-][0-9A-Za-z~_]+)*)$",
    )
    .expect("version pattern should compile")
});

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionParseError {
    #[error("Empty version string")]
    Empty,
    #[error("Unrecognised version format: {input}")]
    InvalidFormat { input: String },
    #[error("Version {component} out of range: {value}")]
    OutOfRange {
        component: &'static str,
        value: String,
    },
}

/// A package version as reported by dpkg, Homebrew or a find script.
///
/// Modelled on dpkg's `[epoch:]upstream[-revision]`, where the revision is
/// everything after the last `-`. Semantic versions (`1.2.3+build.5`) and
/// brew revisions (`1.7.1_1`) are plain upstream versions in this model.
/// Comparison is dpkg's: epoch numerically, then upstream and revision with
/// `verrevcmp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    text: String,
    epoch: u64,
    upstream: String,
    revision: String,
}

impl Version {
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub fn upstream(&self) -> &str {
        &self.upstream
    }

    #[must_use]
    pub fn revision(&self) -> Option<&str> {
        (!self.revision.is_empty()).then_some(self.revision.as_str())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether `installed` fulfils a request for `self`, where `self` may
    /// name only a release line (`3.11` is satisfied by `3.11.6` and
    /// `3.11.6_1`, not by `3.110`). A request with a revision must match
    /// exactly.
    #[must_use]
    pub fn is_satisfied_by(&self, installed: &Version) -> bool {
        if self == installed {
            return true;
        }
        if self.epoch != installed.epoch || !self.revision.is_empty() {
            return false;
        }
        installed
            .upstream
            .strip_prefix(self.upstream.as_str())
            .is_some_and(|rest| rest.starts_with(['.', '_']))
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(VersionParseError::Empty);
        }

        let caps = VERSION_PATTERN
            .captures(s)
            .ok_or_else(|| VersionParseError::InvalidFormat {
                input: s.to_string(),
            })?;

        let epoch = caps.name("epoch").map_or(Ok(0), |m| {
            m.as_str()
                .parse()
                .map_err(|_| VersionParseError::OutOfRange {
                    component: "epoch",
                    value: m.as_str().to_string(),
                })
        })?;
        let body = &caps["body"];
        let (upstream, revision) = body.rsplit_once('-').unwrap_or((body, ""));

        Ok(Self {
            text: s.strip_prefix('v').unwrap_or(s).to_string(),
            epoch,
            upstream: upstream.to_string(),
            revision: revision.to_string(),
        })
    }
}

impl TryFrom<String> for Version {
    type Error = VersionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.text
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn char_weight(c: Option<u8>) -> i32 {
    match c {
        None => 0,
        Some(b'~') => -1,
        Some(c) if c.is_ascii_digit() => 0,
        Some(c) if c.is_ascii_alphabetic() => i32::from(c),
        Some(c) => i32::from(c) + 256,
    }
}

/// dpkg's `verrevcmp`: alternate between non-digit runs, compared by
/// [`char_weight`], and digit runs, compared numerically.
fn compare_fragment(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let (mut i, mut j) = (0, 0);

    while i < a.len() || j < b.len() {
        while a.get(i).is_some_and(|c| !c.is_ascii_digit())
            || b.get(j).is_some_and(|c| !c.is_ascii_digit())
        {
            let left = char_weight(a.get(i).copied());
            let right = char_weight(b.get(j).copied());
            if left != right {
                return left.cmp(&right);
            }
            i += 1;
            j += 1;
        }

        while a.get(i) == Some(&b'0') {
            i += 1;
        }
        while b.get(j) == Some(&b'0') {
            j += 1;
        }

        let mut first_diff = Ordering::Equal;
        while let (Some(x), Some(y)) = (a.get(i), b.get(j)) {
            if !x.is_ascii_digit() || !y.is_ascii_digit() {
                break;
            }
            if first_diff.is_eq() {
                first_diff = x.cmp(y);
            }
            i += 1;
            j += 1;
        }

        if a.get(i).is_some_and(u8::is_ascii_digit) {
            return Ordering::Greater;
        }
        if b.get(j).is_some_and(u8::is_ascii_digit) {
            return Ordering::Less;
        }
        if first_diff.is_ne() {
            return first_diff;
        }
    }

    Ordering::Equal
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| compare_fragment(&self.upstream, &other.upstream))
            .then_with(|| compare_fragment(&self.revision, &other.revision))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for Version {}

#[cfg(test)]
mod tests {
    use super::{Version, VersionParseError};

    fn v(s: &str) -> Version {
        s.parse().expect("test version should parse")
    }

    #[test]
    fn parses_distribution_versions() {
        let ubuntu = v("1.18.0-6ubuntu14.3");
        assert_eq!(ubuntu.upstream(), "1.18.0");
        assert_eq!(ubuntu.revision(), Some("6ubuntu14.3"));
        assert_eq!(ubuntu.epoch(), 0);

        let vim = v("2:8.2.3995-1ubuntu2.7");
        assert_eq!(vim.epoch(), 2);
        assert_eq!(vim.upstream(), "8.2.3995");
        assert_eq!(vim.to_string(), "2:8.2.3995-1ubuntu2.7");

        let zlib = v("1:1.2.11.dfsg-2ubuntu9.2");
        assert_eq!(zlib.epoch(), 1);
        assert_eq!(zlib.upstream(), "1.2.11.dfsg");
        assert_eq!(zlib.revision(), Some("2ubuntu9.2"));

        let openssl = v("3.0.2.dfsg.1-1");
        assert_eq!(openssl.upstream(), "3.0.2.dfsg.1");
        assert_eq!(openssl.revision(), Some("1"));

        assert_eq!(v("1.2.3.final").revision(), None);
    }

    #[test]
    fn revision_starts_after_the_last_dash() {
        let version = v("2.0-rc1-3");
        assert_eq!(version.upstream(), "2.0-rc1");
        assert_eq!(version.revision(), Some("3"));
    }

    #[test]
    fn parses_brew_and_semver_shapes() {
        assert_eq!(v("1.7.1_1").upstream(), "1.7.1_1");
        assert_eq!(v("v1.2.3+build.5").upstream(), "1.2.3+build.5");
        assert_eq!(v("v1.2.3+build.5").to_string(), "1.2.3+build.5");
        assert_eq!(v("1.0~rc1").revision(), None);
        assert_eq!(v("1.0.2k").upstream(), "1.0.2k");
    }

    #[test]
    fn display_keeps_written_segments() {
        assert_eq!(v("3.11").to_string(), "3.11");
        assert_eq!(v(" 3.11.0 ").to_string(), "3.11.0");
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!("".parse::<Version>(), Err(VersionParseError::Empty));
        assert_eq!("   ".parse::<Version>(), Err(VersionParseError::Empty));
        for bad in ["1..2", "abc", "1.2.3-", "1.2.", ".1", "1.2 3", "1.2.3+", "a:1.0", "1:2:3"] {
            assert!(
                matches!(
                    bad.parse::<Version>(),
                    Err(VersionParseError::InvalidFormat { .. })
                ),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_epoch_that_overflows() {
        assert!(matches!(
            "99999999999999999999999:1.0".parse::<Version>(),
            Err(VersionParseError::OutOfRange {
                component: "epoch",
                ..
            })
        ));
    }

    #[test]
    fn long_digit_runs_compare_numerically() {
        assert!(v("1.99999999999999999999999") > v("1.9999999999999999999999"));
        assert!(v("1.10") > v("1.9"));
        assert_eq!(v("1.010"), v("1.10"));
    }

    #[test]
    fn extra_segments_sort_after_shorter_release() {
        assert!(v("3.11") < v("3.11.0"));
        assert!(v("3.11") < v("3.11.1"));
        assert!(v("3.9") < v("3.11"));
    }

    #[test]
    fn epoch_outranks_release() {
        assert!(v("1:1.0") > v("9.9"));
        assert_eq!(v("0:1.0"), v("1.0"));
        assert!(v("1:1.2.11.dfsg-2ubuntu9.2") > v("1.2.13.dfsg-1"));
    }

    #[test]
    fn qualifiers_follow_dpkg_ordering() {
        assert!(v("1.0~rc1") < v("1.0"));
        assert!(v("1.0") < v("1.0-1"));
        assert!(v("1.18.0-6ubuntu9") < v("1.18.0-6ubuntu14"));
        assert!(v("1.18.0-6ubuntu14.3") < v("1.18.0-6ubuntu14.10"));
        assert!(v("2.7.18-1~22.04") < v("2.7.18-1"));
        assert!(v("1.0") < v("1.0a"));
        assert!(v("1.0+dfsg-1") > v("1.0-1"));
        assert!(v("1.0+dfsg-1") < v("1.0+dfsg-2"));
        assert_ne!(v("1.0+dfsg-1"), v("1.0.0+dfsg-1"));
        assert!(v("1.2.11.dfsg-2ubuntu9.2") > v("1.2.11-2ubuntu9.2"));
        assert!(v("3.0.2.dfsg.1-1") < v("3.0.2.dfsg.2-1"));
        assert!(v("1.2.3.final") > v("1.2.3"));
    }

    #[test]
    fn missing_revision_equals_zero_revision() {
        assert_eq!(v("1.0"), v("1.0-0"));
        assert_ne!(v("1.0+dfsg"), v("1.0"));
    }

    #[test]
    fn release_line_is_satisfied_by_patch_releases() {
        assert!(v("3.11").is_satisfied_by(&v("3.11.6")));
        assert!(v("3.11").is_satisfied_by(&v("3.11.0_1")));
        assert!(v("3.11.6").is_satisfied_by(&v("3.11.6")));
        assert!(!v("3.11").is_satisfied_by(&v("3.12.0")));
        assert!(!v("3.11").is_satisfied_by(&v("3.110")));
        assert!(!v("3.11.6").is_satisfied_by(&v("3.11")));
        assert!(!v("1.0-1").is_satisfied_by(&v("1.0.3-2")));
        assert!(!v("1:3.11").is_satisfied_by(&v("3.11.2")));
    }

    #[test]
    fn serde_uses_the_written_text() {
        let json = serde_json::to_string(&v("1.18.0-6ubuntu14.3")).expect("serialize");
        assert_eq!(json, "\"1.18.0-6ubuntu14.3\"");

        let parsed: Version = serde_json::from_str("\"3.11\"").expect("deserialize");
        assert_eq!(parsed.to_string(), "3.11");

        assert!(serde_json::from_str::<Version>("\"not a version\"").is_err());
    }
}
