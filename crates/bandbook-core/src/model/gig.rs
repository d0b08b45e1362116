use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::model::ids::{GigId, MemberId, SetlistId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GigStatus {
    #[default]
    Pending,
    Confirmed,
    Canceled,
}

impl fmt::Display for GigStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Canceled => "canceled",
        })
    }
}

impl FromStr for GigStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "canceled" | "cancelled" => Ok(Self::Canceled),
            _ => Err(Error::InvalidData(format!("unknown gig status: {s}"))),
        }
    }
}

/// Who plays what at a gig.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineupSlot {
    pub member_id: MemberId,
    pub instrument: String,
    #[serde(default)]
    pub is_replacement: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GigComment {
    pub author: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A scheduled performance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gig {
    pub id: GigId,
    pub name: String,
    /// Performance date, ISO `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub venue: String,
    #[serde(default)]
    pub status: GigStatus,
    #[serde(default)]
    pub lineup: Vec<LineupSlot>,
    #[serde(default)]
    pub set_ids: Vec<SetlistId>,
    #[serde(default)]
    pub comments: Vec<GigComment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Gig {
    #[must_use]
    pub fn new(name: impl Into<String>, date: NaiveDate, venue: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: GigId::new(),
            name: name.into(),
            date,
            venue: venue.into(),
            status: GigStatus::Pending,
            lineup: Vec::new(),
            set_ids: Vec::new(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<GigId>) -> Self {
        self.id = id.into();
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: GigStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_set(mut self, set_id: impl Into<SetlistId>) -> Self {
        self.set_ids.push(set_id.into());
        self
    }

    #[must_use]
    pub fn with_player(
        mut self,
        member_id: impl Into<MemberId>,
        instrument: impl Into<String>,
        is_replacement: bool,
    ) -> Self {
        self.book(member_id, instrument, is_replacement);
        self
    }

    /// Put a member in the lineup, replacing any earlier slot for them.
    pub fn book(
        &mut self,
        member_id: impl Into<MemberId>,
        instrument: impl Into<String>,
        is_replacement: bool,
    ) {
        let member_id = member_id.into();
        self.lineup.retain(|slot| slot.member_id != member_id);
        self.lineup.push(LineupSlot {
            member_id,
            instrument: instrument.into(),
            is_replacement,
        });
    }

    #[must_use]
    pub fn features(&self, member_id: &MemberId) -> bool {
        self.lineup.iter().any(|slot| &slot.member_id == member_id)
    }

    pub fn add_comment(&mut self, author: impl Into<String>, text: impl Into<String>) {
        self.comments.push(GigComment {
            author: author.into(),
            text: text.into(),
            created_at: Utc::now(),
        });
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 21).unwrap()
    }

    #[test]
    fn test_gig_new_is_pending() {
        let gig = Gig::new("Midsummer", date(), "Harbour Stage");
        assert_eq!(gig.status, GigStatus::Pending);
        assert!(gig.lineup.is_empty());
    }

    #[test]
    fn test_with_player_replaces_existing_slot() {
        let gig = Gig::new("Midsummer", date(), "Harbour Stage")
            .with_player("m1", "bass", false)
            .with_player("m1", "guitar", false)
            .with_player("sub", "drums", true);

        assert_eq!(gig.lineup.len(), 2);
        assert_eq!(gig.lineup[1].instrument, "guitar");
        assert!(gig.features(&MemberId::from("sub")));
        assert!(!gig.features(&MemberId::from("m9")));
    }

    #[test]
    fn test_gig_date_is_iso() {
        let gig = Gig::new("Midsummer", date(), "Harbour Stage");
        let json = serde_json::to_value(&gig).unwrap();
        assert_eq!(json["date"], "2026-06-21");
        assert_eq!(json["status"], "pending");
    }

    #[test]
    fn test_status_parsing_accepts_both_spellings() {
        assert_eq!("Cancelled".parse::<GigStatus>().unwrap(), GigStatus::Canceled);
        assert_eq!("canceled".parse::<GigStatus>().unwrap(), GigStatus::Canceled);
        assert!("postponed".parse::<GigStatus>().is_err());
    }

    #[test]
    fn test_add_comment() {
        let mut gig = Gig::new("Midsummer", date(), "Harbour Stage");
        gig.add_comment("Rikke", "Load-in at 17:00");
        assert_eq!(gig.comments.len(), 1);
        assert_eq!(gig.comments[0].author, "Rikke");
    }
}
