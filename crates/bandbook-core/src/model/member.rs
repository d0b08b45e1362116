use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{MemberId, UserId};

/// A musician who plays with the band.
///
/// Core members form the fixed roster whose availability decides whether a
/// date works. Everyone else is a replacement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BandMember {
    pub id: MemberId,
    pub name: String,
    pub instrument: String,

    /// Login account linked to this member, if any.
    #[serde(default)]
    pub user_id: Option<UserId>,

    #[serde(default)]
    pub is_core: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BandMember {
    #[must_use]
    pub fn new(name: impl Into<String>, instrument: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: MemberId::new(),
            name: name.into(),
            instrument: instrument.into(),
            user_id: None,
            is_core: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<MemberId>) -> Self {
        self.id = id.into();
        self
    }

    #[must_use]
    pub fn core(mut self) -> Self {
        self.is_core = true;
        self
    }

    #[must_use]
    pub fn with_user(mut self, user_id: impl Into<UserId>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_defaults_to_replacement() {
        let member = BandMember::new("Sub Drummer", "drums");
        assert!(!member.is_core);
        assert!(member.user_id.is_none());
    }

    #[test]
    fn test_member_builder() {
        let member = BandMember::new("Rikke", "vocals").with_id("m1").core().with_user("u1");
        assert!(member.is_core);
        assert_eq!(member.id.as_str(), "m1");
        assert_eq!(member.user_id, Some(UserId::from("u1")));
    }

    #[test]
    fn test_member_wire_format() {
        let member = BandMember::new("Lorentz", "guitar").core();
        let json = serde_json::to_value(&member).unwrap();
        assert_eq!(json["isCore"], true);
        assert!(json.get("userId").is_some());
    }
}
