use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::model::ids::{SetlistId, SongId, UserId};

/// How a setlist came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetlistOrigin {
    #[default]
    Manual,
    Generated,
}

impl fmt::Display for SetlistOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Manual => "manual",
            Self::Generated => "generated",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetlistMetadata {
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub origin: SetlistOrigin,
    /// Generator's explanation of the running order, for generated sets.
    #[serde(default)]
    pub explanation: Option<String>,
}

/// An ordered list of songs for one segment of a performance.
///
/// Only song ids are stored. The full songs are looked up from the catalog
/// every time the set is read, so catalog edits show up everywhere at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setlist {
    pub id: SetlistId,
    pub name: String,
    #[serde(deserialize_with = "unique_song_ids")]
    song_ids: Vec<SongId>,
    #[serde(default)]
    pub created_by: Option<UserId>,
    #[serde(default)]
    pub metadata: SetlistMetadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn dedup_song_ids<I, S>(ids: I) -> Vec<SongId>
where
    I: IntoIterator<Item = S>,
    S: Into<SongId>,
{
    let mut seen = HashSet::new();
    ids.into_iter()
        .map(Into::into)
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Stored running orders go through the same first-wins rule as `set_songs`.
fn unique_song_ids<'de, D>(deserializer: D) -> Result<Vec<SongId>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<SongId>::deserialize(deserializer).map(dedup_song_ids)
}

impl Setlist {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: SetlistId::new(),
            name: name.into(),
            song_ids: Vec::new(),
            created_by: None,
            metadata: SetlistMetadata::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<SetlistId>) -> Self {
        self.id = id.into();
        self
    }

    #[must_use]
    pub fn with_songs<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SongId>,
    {
        self.set_songs(ids);
        self
    }

    #[must_use]
    pub fn created_by(mut self, user: impl Into<UserId>) -> Self {
        self.created_by = Some(user.into());
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: SetlistMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    #[must_use]
    pub fn song_ids(&self) -> &[SongId] {
        &self.song_ids
    }

    /// Replace the running order. Repeated ids keep their first position.
    pub fn set_songs<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<SongId>,
    {
        self.song_ids = dedup_song_ids(ids);
    }

    /// Append a song unless it is already in the set. Returns whether it was added.
    pub fn push_song(&mut self, id: impl Into<SongId>) -> bool {
        let id = id.into();
        if self.song_ids.contains(&id) {
            return false;
        }
        self.song_ids.push(id);
        true
    }

    /// Remove a song. Returns whether it was present.
    pub fn remove_song(&mut self, id: &SongId) -> bool {
        let before = self.song_ids.len();
        self.song_ids.retain(|s| s != id);
        self.song_ids.len() != before
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setlist_new_is_empty_manual() {
        let set = Setlist::new("Set 1");
        assert!(set.song_ids().is_empty());
        assert_eq!(set.metadata.origin, SetlistOrigin::Manual);
    }

    #[test]
    fn test_set_songs_drops_repeats() {
        let set = Setlist::new("Set 1").with_songs(["a", "b", "a", "c", "b"]);
        let ids: Vec<&str> = set.song_ids().iter().map(SongId::as_str).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_push_and_remove_song() {
        let mut set = Setlist::new("Encore").with_songs(["a"]);
        assert!(set.push_song("b"));
        assert!(!set.push_song("a"));
        assert!(set.remove_song(&SongId::from("a")));
        assert!(!set.remove_song(&SongId::from("zzz")));
        assert_eq!(set.song_ids(), &[SongId::from("b")]);
    }

    #[test]
    fn test_setlist_serializes_song_ids_only() {
        let set = Setlist::new("Set 2").with_songs(["x", "y"]);
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["songIds"], serde_json::json!(["x", "y"]));
    }

    #[test]
    fn test_deserialize_drops_repeated_song_ids() {
        let json = serde_json::json!({
            "id": "set-1",
            "name": "Set 1",
            "songIds": ["a", "b", "a"],
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z",
        });
        let set: Setlist = serde_json::from_value(json).unwrap();
        assert_eq!(set.song_ids(), &[SongId::from("a"), SongId::from("b")]);
    }
}
