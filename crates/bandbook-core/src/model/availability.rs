use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::model::day::DayKey;
use crate::model::ids::MemberId;

/// A member's answer for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityStatus {
    Available,
    Maybe,
    Unavailable,
}

impl fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Available => "available",
            Self::Maybe => "maybe",
            Self::Unavailable => "unavailable",
        })
    }
}

impl FromStr for AvailabilityStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_lowercase().as_str() {
            "available" | "yes" => Ok(Self::Available),
            "maybe" => Ok(Self::Maybe),
            "unavailable" | "no" => Ok(Self::Unavailable),
            _ => Err(Error::InvalidData(format!("unknown availability status: {s}"))),
        }
    }
}

/// One member's availability response for one day.
///
/// There is at most one entry per (day, member); a new submission for the
/// same pair replaces the old one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityEntry {
    #[serde(rename = "dateString")]
    pub day: DayKey,
    pub member_id: MemberId,
    pub status: AvailabilityStatus,
    #[serde(default)]
    pub comment: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl AvailabilityEntry {
    #[must_use]
    pub fn new(day: DayKey, member_id: impl Into<MemberId>, status: AvailabilityStatus) -> Self {
        Self {
            day,
            member_id: member_id.into(),
            status,
            comment: None,
            updated_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Storage key: the day first so a day's entries share a prefix.
    #[must_use]
    pub fn key_for(day: DayKey, member_id: &MemberId) -> String {
        format!("{}{member_id}", Self::day_prefix(day))
    }

    #[must_use]
    pub fn day_prefix(day: DayKey) -> String {
        format!("{day}/")
    }
}
