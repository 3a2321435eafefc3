//! Content addressing for segments.
//!
//! A [`Fingerprint`] is a 128-bit xxh3 digest of a segment's content and is
//! the only notion of "same content" the rest of the crate uses. The
//! [`ContentAddresser`] hashes raw bytes by default; whitespace-insensitive
//! addressing must be opted into.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use xxhash_rust::xxh3::xxh3_128;

/// Fixed-width deterministic digest of segment content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(u128);

impl Fingerprint {
    /// Fingerprint raw bytes.
    #[must_use]
    pub fn of_bytes(data: &[u8]) -> Self {
        Self(xxh3_128(data))
    }

    /// Wrap an existing digest value.
    #[must_use]
    pub const fn from_raw(value: u128) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn as_u128(self) -> u128 {
        self.0
    }

    /// Short form for logs and tables.
    #[must_use]
    pub fn short(&self) -> String {
        let full = self.to_string();
        full[..12].to_string()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

/// Error returned when parsing a fingerprint from hex.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid fingerprint '{0}': expected 32 hex digits")]
pub struct ParseFingerprintError(String);

impl FromStr for Fingerprint {
    type Err = ParseFingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 {
            return Err(ParseFingerprintError(s.to_string()));
        }
        u128::from_str_radix(s, 16)
            .map(Self)
            .map_err(|_| ParseFingerprintError(s.to_string()))
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Computes fingerprints under a fixed normalization policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentAddresser {
    ignore_whitespace: bool,
}

impl ContentAddresser {
    /// Addresser that hashes raw bytes.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ignore_whitespace: false,
        }
    }

    /// Addresser that ignores incidental whitespace (line endings, trailing
    /// whitespace, leading and trailing blank lines).
    #[must_use]
    pub const fn whitespace_insensitive() -> Self {
        Self {
            ignore_whitespace: true,
        }
    }

    #[must_use]
    pub const fn with_ignore_whitespace(ignore_whitespace: bool) -> Self {
        Self { ignore_whitespace }
    }

    #[must_use]
    pub const fn ignores_whitespace(&self) -> bool {
        self.ignore_whitespace
    }

    /// Fingerprint a segment's content.
    #[must_use]
    pub fn fingerprint(&self, content: &str) -> Fingerprint {
        if self.ignore_whitespace {
            Fingerprint::of_bytes(normalize_whitespace(content).as_bytes())
        } else {
            Fingerprint::of_bytes(content.as_bytes())
        }
    }
}

fn normalize_whitespace(content: &str) -> String {
    let lines: Vec<&str> = content.lines().map(str::trim_end).collect();
    let start = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !l.is_empty()).map_or(start, |i| i + 1);
    lines[start..end].join("\n")
}
