//! Availability aggregation.
//!
//! Collapses the core roster's responses for a calendar day into a single
//! [`DateStatus`]. The roster must have answered in full before any
//! response is allowed to count: until then the day is `unknown`.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::Result;
use crate::model::{AvailabilityEntry, AvailabilityStatus, BandMember, DayKey, MemberId};

/// Aggregate status of a calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateStatus {
    /// Every core member is available.
    Full,
    /// Nobody is unavailable, but at least one core member said maybe.
    Partial,
    /// At least one core member is unavailable.
    Conflict,
    /// Not every core member has answered yet.
    Unknown,
}

impl DateStatus {
    /// Severity for sorting: conflict > partial > full > unknown.
    #[must_use]
    pub const fn severity(self) -> u8 {
        match self {
            Self::Conflict => 3,
            Self::Partial => 2,
            Self::Full => 1,
            Self::Unknown => 0,
        }
    }
}

impl fmt::Display for DateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Full => "full",
            Self::Partial => "partial",
            Self::Conflict => "conflict",
            Self::Unknown => "unknown",
        })
    }
}

/// The members whose answers decide a day.
#[must_use]
pub fn core_roster(members: &[BandMember]) -> Vec<BandMember> {
    members.iter().filter(|m| m.is_core).cloned().collect()
}

/// Classify one day from the roster and that day's entries.
///
/// Entries for anyone outside `core_members` are ignored. An empty roster
/// has nothing outstanding and is `Full`.
#[must_use]
pub fn aggregate(core_members: &[BandMember], entries_for_date: &[AvailabilityEntry]) -> DateStatus {
    let roster: HashSet<&MemberId> = core_members.iter().map(|m| &m.id).collect();

    let relevant: Vec<&AvailabilityEntry> = entries_for_date
        .iter()
        .filter(|e| roster.contains(&e.member_id))
        .collect();

    let responded: HashSet<&MemberId> = relevant.iter().map(|e| &e.member_id).collect();
    if responded.len() < roster.len() {
        return DateStatus::Unknown;
    }

    if relevant
        .iter()
        .any(|e| e.status == AvailabilityStatus::Unavailable)
    {
        DateStatus::Conflict
    } else if relevant.iter().any(|e| e.status == AvailabilityStatus::Maybe) {
        DateStatus::Partial
    } else {
        DateStatus::Full
    }
}

/// One day of a month overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayOverview {
    pub day: DayKey,
    pub status: DateStatus,
    /// Core members' responses for the day, in roster order. Missing
    /// answers are `None`.
    pub responses: Vec<(MemberId, Option<AvailabilityStatus>)>,
}

/// Evaluate every day of a month.
///
/// `entries` may span any range of days; only those falling in the month
/// are used.
pub fn month_overview(
    year: i32,
    month: u32,
    core_members: &[BandMember],
    entries: &[AvailabilityEntry],
) -> Result<Vec<DayOverview>> {
    let mut by_day: HashMap<DayKey, Vec<AvailabilityEntry>> = HashMap::new();
    for entry in entries {
        by_day.entry(entry.day).or_default().push(entry.clone());
    }

    let days = DayKey::days_in_month(year, month)?;
    Ok(days
        .into_iter()
        .map(|day| {
            let day_entries = by_day.get(&day).map(Vec::as_slice).unwrap_or_default();
            day_overview(day, core_members, day_entries)
        })
        .collect())
}

/// Status and per-member answers for a single day.
#[must_use]
pub fn day_overview(
    day: DayKey,
    core_members: &[BandMember],
    entries_for_date: &[AvailabilityEntry],
) -> DayOverview {
    let responses = core_members
        .iter()
        .map(|m| {
            let status = entries_for_date
                .iter()
                .find(|e| e.member_id == m.id)
                .map(|e| e.status);
            (m.id.clone(), status)
        })
        .collect();
    DayOverview {
        day,
        status: aggregate(core_members, entries_for_date),
        responses,
    }
}
