use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::model::duration::SongDuration;
use crate::model::ids::SongId;

/// Language a song is sung in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Danish,
    English,
}

/// Who sings lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Vocalist {
    Rikke,
    Lorentz,
    Both,
}

/// Rough energy level, used to shape a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Energy {
    Low,
    Medium,
    High,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Danish => "danish",
            Self::English => "english",
        })
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_lowercase().as_str() {
            "danish" | "da" => Ok(Self::Danish),
            "english" | "en" => Ok(Self::English),
            _ => Err(Error::InvalidData(format!("unknown language: {s}"))),
        }
    }
}

impl fmt::Display for Vocalist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rikke => "Rikke",
            Self::Lorentz => "Lorentz",
            Self::Both => "Both",
        })
    }
}

impl FromStr for Vocalist {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_lowercase().as_str() {
            "rikke" => Ok(Self::Rikke),
            "lorentz" => Ok(Self::Lorentz),
            "both" => Ok(Self::Both),
            _ => Err(Error::InvalidData(format!("unknown vocalist: {s}"))),
        }
    }
}

impl fmt::Display for Energy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        })
    }
}

impl FromStr for Energy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(Error::InvalidData(format!("unknown energy level: {s}"))),
        }
    }
}

/// A song in the band's catalog.
///
/// The catalog copy is authoritative. Setlists and gigs refer to songs by
/// [`SongId`] only and hydrate through the assembler on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: SongId,
    pub title: String,
    pub artist: String,

    /// Musical key (e.g., "Am", "D").
    #[serde(default)]
    pub key: Option<String>,

    #[serde(default)]
    pub duration: Option<SongDuration>,

    pub language: Language,
    pub vocalist: Vocalist,
    pub energy: Energy,

    /// Bass the song is played on (e.g., "4-string", "5-string").
    #[serde(default)]
    pub bass_guitar: Option<String>,

    /// Guitar the song is played on (e.g., "acoustic", "telecaster").
    #[serde(default)]
    pub guitar: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Name of the medley this song belongs to, if any.
    #[serde(default)]
    pub medley: Option<String>,
    #[serde(default)]
    pub medley_position: Option<u32>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Song {
    /// Create a song with neutral defaults: English, shared vocals, medium energy.
    #[must_use]
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: SongId::new(),
            title: title.into(),
            artist: artist.into(),
            key: None,
            duration: None,
            language: Language::English,
            vocalist: Vocalist::Both,
            energy: Energy::Medium,
            bass_guitar: None,
            guitar: None,
            tags: Vec::new(),
            medley: None,
            medley_position: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<SongId>) -> Self {
        self.id = id.into();
        self
    }

    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_duration(mut self, duration: SongDuration) -> Self {
        self.duration = Some(duration);
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    #[must_use]
    pub fn with_vocalist(mut self, vocalist: Vocalist) -> Self {
        self.vocalist = vocalist;
        self
    }

    #[must_use]
    pub fn with_energy(mut self, energy: Energy) -> Self {
        self.energy = energy;
        self
    }

    #[must_use]
    pub fn with_bass_guitar(mut self, bass: impl Into<String>) -> Self {
        self.bass_guitar = Some(bass.into());
        self
    }

    #[must_use]
    pub fn with_guitar(mut self, guitar: impl Into<String>) -> Self {
        self.guitar = Some(guitar.into());
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    #[must_use]
    pub fn in_medley(mut self, medley: impl Into<String>, position: u32) -> Self {
        self.medley = Some(medley.into());
        self.medley_position = Some(position);
        self
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Case-insensitive tag check.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Catalog listing filter; unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct SongFilter {
    pub language: Option<Language>,
    pub vocalist: Option<Vocalist>,
    pub energy: Option<Energy>,
    pub tag: Option<String>,
    /// Substring match against title or artist, case-insensitive.
    pub text: Option<String>,
}

impl SongFilter {
    #[must_use]
    pub fn matches(&self, song: &Song) -> bool {
        if self.language.is_some_and(|l| l != song.language)
            || self.vocalist.is_some_and(|v| v != song.vocalist)
            || self.energy.is_some_and(|e| e != song.energy)
        {
            return false;
        }
        if let Some(tag) = &self.tag {
            if !song.has_tag(tag) {
                return false;
            }
        }
        if let Some(text) = &self.text {
            let needle = text.to_lowercase();
            return song.title.to_lowercase().contains(&needle)
                || song.artist.to_lowercase().contains(&needle);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_song_new() {
        let song = Song::new("Dancing Queen", "ABBA");
        assert_eq!(song.title, "Dancing Queen");
        assert_eq!(song.language, Language::English);
        assert!(song.duration.is_none());
        assert!(song.tags.is_empty());
    }

    #[test]
    fn test_song_builder() {
        let song = Song::new("Kvinde min", "Gasolin'")
            .with_id("s1")
            .with_language(Language::Danish)
            .with_vocalist(Vocalist::Lorentz)
            .with_energy(Energy::Low)
            .with_bass_guitar("4-string")
            .with_tag("ballad")
            .in_medley("Gasolin medley", 2);

        assert_eq!(song.id.as_str(), "s1");
        assert_eq!(song.vocalist, Vocalist::Lorentz);
        assert_eq!(song.bass_guitar, Some("4-string".to_string()));
        assert_eq!(song.medley_position, Some(2));
        assert!(song.has_tag("BALLAD"));
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(serde_json::to_string(&Language::Danish).unwrap(), "\"danish\"");
        assert_eq!(serde_json::to_string(&Vocalist::Rikke).unwrap(), "\"Rikke\"");
        assert_eq!(serde_json::to_string(&Energy::High).unwrap(), "\"High\"");
    }

    #[test]
    fn test_enum_from_str_is_case_insensitive() {
        assert_eq!("DANISH".parse::<Language>().unwrap(), Language::Danish);
        assert_eq!("lorentz".parse::<Vocalist>().unwrap(), Vocalist::Lorentz);
        assert_eq!("medium".parse::<Energy>().unwrap(), Energy::Medium);
        assert!("german".parse::<Language>().is_err());
    }

    #[test]
    fn test_song_deserializes_camel_case_with_numeric_duration() {
        let json = r#"{
            "id": "x1", "title": "Song", "artist": "Band",
            "duration": 4.1, "language": "danish", "vocalist": "Both",
            "energy": "High", "bassGuitar": "5-string", "medleyPosition": null,
            "createdAt": "2026-01-01T00:00:00Z", "updatedAt": "2026-01-01T00:00:00Z"
        }"#;
        let song: Song = serde_json::from_str(json).unwrap();
        assert_eq!(song.duration.unwrap().as_secs(), 246);
        assert_eq!(song.bass_guitar.as_deref(), Some("5-string"));
        assert!(song.tags.is_empty());
    }

    #[test]
    fn test_filter_matches() {
        let song = Song::new("Hurtig", "Band")
            .with_language(Language::Danish)
            .with_energy(Energy::High)
            .with_tag("opener");

        assert!(SongFilter::default().matches(&song));
        assert!(SongFilter { language: Some(Language::Danish), ..Default::default() }.matches(&song));
        assert!(!SongFilter { energy: Some(Energy::Low), ..Default::default() }.matches(&song));
        assert!(SongFilter { tag: Some("Opener".into()), ..Default::default() }.matches(&song));
        assert!(SongFilter { text: Some("hur".into()), ..Default::default() }.matches(&song));
        assert!(!SongFilter { text: Some("zzz".into()), ..Default::default() }.matches(&song));
    }
}
