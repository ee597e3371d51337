//! Microsecond-precision UTC timestamps with a fixed canonical rendering.
//!
//! The canonical form is `YYYY-MM-DDTHH:MM:SS.ffffffZ` with exactly six
//! fractional digits and a literal `Z` suffix. Zero-fraction instants still
//! render `.000000` so that formatting round-trips byte-for-byte.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Timelike, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CepError, CepResult};

/// A UTC instant truncated to microsecond precision.
///
/// Ordering follows the instant value; equal canonical strings imply equal
/// instants and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalTimestamp(DateTime<Utc>);

impl CanonicalTimestamp {
    /// Parses an RFC 3339 timestamp (with `Z` or a numeric offset) into a
    /// canonical UTC instant. Sub-microsecond digits are truncated.
    pub fn parse(value: &str) -> CepResult<Self> {
        let parsed = DateTime::parse_from_rfc3339(value)
            .map_err(|_| CepError::InvalidTimestamp(value.to_string()))?;
        Ok(Self::from_datetime(parsed.with_timezone(&Utc)))
    }

    /// Wraps an existing instant, truncating to microsecond precision.
    pub fn from_datetime(instant: DateTime<Utc>) -> Self {
        let micros = instant.timestamp_subsec_micros();
        let truncated = instant
            .with_nanosecond(micros * 1_000)
            .expect("microseconds are within nanosecond range");
        Self(truncated)
    }

    /// The current instant, truncated to microsecond precision.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Renders the canonical form: six fractional digits, `Z` suffix.
    pub fn to_canonical_string(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
    }

    /// The underlying UTC instant.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl fmt::Display for CanonicalTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl FromStr for CanonicalTimestamp {
    type Err = CepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for CanonicalTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_canonical_string())
    }
}

impl<'de> Deserialize<'de> for CanonicalTimestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(de::Error::custom)
    }
}
