//! Server build version and the capabilities derived from it.

use std::fmt;
use std::str::FromStr;

use aerospike_core::{AerospikeError, Result};

/// A server build version, `<major>.<minor>.<patch>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BuildVersion {
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
    /// Patch version.
    pub patch: u32,
}

/// First version that answers the bitmap partition query.
pub const NEW_INFO_VERSION: BuildVersion = BuildVersion::new(2, 6, 6);

impl BuildVersion {
    /// Creates a version.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parses a build string such as `"5.1.0 community edition"`.
    ///
    /// The string must start with three dot-separated decimal numbers; anything
    /// after the third number is ignored.
    pub fn parse(build: &str) -> Result<Self> {
        let bad = || AerospikeError::parse("invalid build version", build);

        let (major, rest) = leading_number(build).ok_or_else(bad)?;
        let rest = rest.strip_prefix('.').ok_or_else(bad)?;
        let (minor, rest) = leading_number(rest).ok_or_else(bad)?;
        let rest = rest.strip_prefix('.').ok_or_else(bad)?;
        let (patch, _suffix) = leading_number(rest).ok_or_else(bad)?;

        Ok(Self::new(major, minor, patch))
    }

    /// Returns whether the server supports the newer info protocol variant.
    pub fn supports_new_info(&self) -> bool {
        self.major > 2
            || (self.major == 2 && (self.minor > 6 || (self.minor == 6 && self.patch >= 6)))
    }
}

fn leading_number(s: &str) -> Option<(u32, &str)> {
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(s.len(), |(i, _)| i);
    if end == 0 {
        return None;
    }
    let value = s[..end].parse().ok()?;
    Some((value, &s[end..]))
}

impl FromStr for BuildVersion {
    type Err = AerospikeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for BuildVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
