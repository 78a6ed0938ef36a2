//! Identifier newtypes for profiles and screenshots.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error returned when a profile identifier fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid profile identifier '{input}': expected a decimal number")]
pub struct ParseIdError {
    input: String,
}

/// Numeric key naming one screenshot on the community site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScreenshotId(u64);

impl ScreenshotId {
    /// Wraps a raw identifier value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw identifier value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ScreenshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 64-bit community profile identifier (e.g. `76561197960279927`).
///
/// Only the format is validated. Whether the profile exists, or is public,
/// is only discovered by scanning it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProfileId(u64);

impl ProfileId {
    /// Wraps a raw profile identifier.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw profile identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Directory name downloads for this profile are written into.
    #[must_use]
    pub fn download_dir_name(self) -> String {
        format!("Screenshots{}", self.0)
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProfileId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_decimal(s).map(Self)
    }
}

fn parse_decimal(input: &str) -> Result<u64, ParseIdError> {
    let trimmed = input.trim();
    // u64::from_str accepts a leading '+', which is not a valid identifier.
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseIdError {
            input: input.to_string(),
        });
    }
    trimmed.parse::<u64>().map_err(|_| ParseIdError {
        input: input.to_string(),
    })
}
