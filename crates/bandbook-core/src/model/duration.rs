//! Song duration, normalized to whole seconds at ingestion.
//!
//! Catalog data arrives either as numeric minutes (`4.1`) or as `"MM:SS"`
//! strings. Both are accepted here and nothing past this boundary needs to
//! know which one was used.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Length of a song in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SongDuration(u32);

impl SongDuration {
    #[must_use]
    pub const fn from_secs(secs: u32) -> Self {
        Self(secs)
    }

    /// Convert numeric minutes, rounding to the nearest second.
    pub fn from_minutes(minutes: f64) -> Result<Self> {
        if !minutes.is_finite() || minutes < 0.0 {
            return Err(Error::InvalidData(format!(
                "duration must be a non-negative number of minutes, got {minutes}"
            )));
        }
        let secs = (minutes * 60.0).round();
        if secs > f64::from(u32::MAX) {
            return Err(Error::InvalidData(format!("duration too large: {minutes}")));
        }
        Ok(Self(secs as u32))
    }

    #[must_use]
    pub const fn as_secs(self) -> u32 {
        self.0
    }

    #[must_use]
    pub fn as_minutes(self) -> f64 {
        f64::from(self.0) / 60.0
    }
}

impl fmt::Display for SongDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl FromStr for SongDuration {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || Error::InvalidData(format!("unrecognised duration: {s:?}"));

        if let Some((mins, secs)) = s.split_once(':') {
            if mins.is_empty() || secs.len() != 2 {
                return Err(invalid());
            }
            let mins: u32 = mins.parse().map_err(|_| invalid())?;
            let secs: u32 = secs.parse().map_err(|_| invalid())?;
            if secs >= 60 {
                return Err(invalid());
            }
            return mins
                .checked_mul(60)
                .and_then(|m| m.checked_add(secs))
                .map(Self)
                .ok_or_else(invalid);
        }

        let minutes: f64 = s.parse().map_err(|_| invalid())?;
        Self::from_minutes(minutes)
    }
}

impl Serialize for SongDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct DurationVisitor;

impl Visitor<'_> for DurationVisitor {
    type Value = SongDuration;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number of minutes or an \"MM:SS\" string")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Self::Value, E> {
        SongDuration::from_minutes(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Self::Value, E> {
        self.visit_f64(v as f64)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Self::Value, E> {
        self.visit_f64(v as f64)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for SongDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(DurationVisitor)
    }
}
