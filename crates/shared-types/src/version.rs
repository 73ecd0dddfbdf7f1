//! # Pipeline Version
//!
//! A `(major, minor)` version marker. Written as `"N"` or `"N_M"`; a missing
//! minor component is `0`.
//!
//! Equality and hashing use both components, so `2_1` and `2_0` are distinct
//! cache keys. Channel names only use the major component.

use crate::errors::VersionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Version marker of one producible payload schema.
///
/// Ordering compares major first, then minor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PipelineVersion {
    major: u32,
    minor: u32,
}

impl PipelineVersion {
    /// Version assigned to a source's default (unsuffixed) producer.
    pub const DEFAULT: Self = Self::new(1, 0);

    /// Create a version from its components.
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parse a `"N"` or `"N_M"` token.
    ///
    /// # Errors
    ///
    /// Returns `VersionError::InvalidFormat` for empty components, signs,
    /// non-decimal characters, extra separators or overflowing numbers.
    pub fn parse(token: &str) -> Result<Self, VersionError> {
        let invalid = || VersionError::InvalidFormat {
            token: token.to_string(),
        };

        let mut parts = token.split('_');
        let major = parts.next().and_then(parse_component).ok_or_else(invalid)?;
        let minor = match parts.next() {
            Some(p) => parse_component(p).ok_or_else(invalid)?,
            None => 0,
        };
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self::new(major, minor))
    }

    /// Derive the version from a payload schema's type name.
    ///
    /// The last path segment (split on `.` or `::`) must look like
    /// `<SourceName>_<major>_<minor>`, e.g. `demo.Widget_1_1`.
    ///
    /// # Errors
    ///
    /// Returns `VersionError::MissingMarker` when the segment has no marker.
    pub fn from_type_name(type_name: &str) -> Result<Self, VersionError> {
        let missing = || VersionError::MissingMarker {
            type_name: type_name.to_string(),
        };

        let segment = type_name
            .rsplit(|c| c == '.' || c == ':')
            .next()
            .unwrap_or(type_name);

        let mut parts = segment.rsplitn(3, '_');
        let minor = parts.next().and_then(parse_component).ok_or_else(missing)?;
        let major = parts.next().and_then(parse_component).ok_or_else(missing)?;
        match parts.next() {
            Some(source) if !source.is_empty() => Ok(Self::new(major, minor)),
            _ => Err(missing()),
        }
    }

    /// Major component.
    #[must_use]
    pub const fn major(&self) -> u32 {
        self.major
    }

    /// Minor component.
    #[must_use]
    pub const fn minor(&self) -> u32 {
        self.minor
    }

    /// The part of the version that appears in channel names.
    #[must_use]
    pub const fn channel_suffix(&self) -> u32 {
        self.major
    }
}

impl Default for PipelineVersion {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for PipelineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.major, self.minor)
    }
}

impl FromStr for PipelineVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_component(part: &str) -> Option<u32> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}
