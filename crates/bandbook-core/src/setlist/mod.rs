//! Setlist assembly.
//!
//! Turns a candidate running order (from a person or from the generator)
//! into a clean setlist: unknown ids are dropped, repeats keep their first
//! position, each surviving reference is replaced by the catalog's song, and
//! positions are renumbered 1..=n over what survived.

pub mod metrics;

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::model::{Language, Setlist, Song, SongId};

pub use metrics::{InstrumentChanges, SetlistMetrics};

/// Field names of a serialized [`Song`]. Candidate keys with these names are
/// stale copies of catalog data and never become annotations.
const SONG_FIELDS: &[&str] = &[
    "id",
    "title",
    "artist",
    "key",
    "duration",
    "language",
    "vocalist",
    "energy",
    "bassGuitar",
    "guitar",
    "tags",
    "medley",
    "medleyPosition",
    "createdAt",
    "updatedAt",
    "position",
];

/// A song reference as submitted, plus whatever else came with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateItem {
    pub id: SongId,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CandidateItem {
    #[must_use]
    pub fn new(id: impl Into<SongId>) -> Self {
        Self {
            id: id.into(),
            extra: serde_json::Map::new(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

impl From<SongId> for CandidateItem {
    fn from(id: SongId) -> Self {
        Self::new(id)
    }
}

/// Snapshot of the song catalog, indexed by id.
#[derive(Debug, Clone, Default)]
pub struct SongCatalog {
    songs: Vec<Song>,
    index: HashMap<SongId, usize>,
}

impl SongCatalog {
    /// Build the lookup once. If two songs share an id the first is kept.
    #[must_use]
    pub fn from_songs(songs: impl IntoIterator<Item = Song>) -> Self {
        let mut catalog = Self::default();
        for song in songs {
            if catalog.index.contains_key(&song.id) {
                log::warn!("Catalog contains duplicate song id {}", song.id);
                continue;
            }
            catalog.index.insert(song.id.clone(), catalog.songs.len());
            catalog.songs.push(song);
        }
        catalog
    }

    #[must_use]
    pub fn get(&self, id: &SongId) -> Option<&Song> {
        self.index.get(id).map(|&i| &self.songs[i])
    }

    #[must_use]
    pub fn contains(&self, id: &SongId) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Song> {
        self.songs.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}

/// A hydrated song at its place in the set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetlistEntry {
    /// 1-based.
    pub position: usize,
    #[serde(flatten)]
    pub song: Song,
    /// Extra candidate fields, e.g. the generator's `reasoning`.
    #[serde(flatten)]
    pub annotations: serde_json::Map<String, serde_json::Value>,
}

impl SetlistEntry {
    /// The id-only reference this entry was built from.
    #[must_use]
    pub fn to_candidate(&self) -> CandidateItem {
        CandidateItem::new(self.song.id.clone())
    }
}

/// What the assembler threw away, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AssemblyReport {
    /// Ids with no catalog song.
    pub unresolved: Vec<SongId>,
    /// Ids that already appeared earlier in the candidate list.
    pub duplicates: Vec<SongId>,
}

impl AssemblyReport {
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.unresolved.len() + self.duplicates.len()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AssembledSetlist {
    pub entries: Vec<SetlistEntry>,
    #[serde(skip)]
    pub report: AssemblyReport,
}

impl AssembledSetlist {
    pub fn songs(&self) -> impl Iterator<Item = &Song> {
        self.entries.iter().map(|e| &e.song)
    }

    #[must_use]
    pub fn song_ids(&self) -> Vec<SongId> {
        self.entries.iter().map(|e| e.song.id.clone()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn metrics(&self, target_language: Language) -> SetlistMetrics {
        SetlistMetrics::compute(self.songs(), target_language)
    }
}

/// Resolve, deduplicate, hydrate and number a candidate running order.
///
/// Never fails: bad references are dropped and listed in the report.
#[must_use]
pub fn assemble<I>(candidates: I, catalog: &SongCatalog) -> AssembledSetlist
where
    I: IntoIterator,
    I::Item: Into<CandidateItem>,
{
    let mut seen: HashSet<SongId> = HashSet::new();
    let mut out = AssembledSetlist::default();

    for candidate in candidates {
        let CandidateItem { id, extra } = candidate.into();

        let Some(song) = catalog.get(&id) else {
            log::debug!("Dropping unresolved song reference {id}");
            out.report.unresolved.push(id);
            continue;
        };
        if !seen.insert(id.clone()) {
            log::debug!("Dropping repeated song reference {id}");
            out.report.duplicates.push(id);
            continue;
        }

        let annotations = extra
            .into_iter()
            .filter(|(key, _)| !SONG_FIELDS.contains(&key.as_str()))
            .collect();

        out.entries.push(SetlistEntry {
            position: out.entries.len() + 1,
            song: song.clone(),
            annotations,
        });
    }

    out
}

impl Setlist {
    /// Look up the stored running order in the catalog.
    #[must_use]
    pub fn hydrate(&self, catalog: &SongCatalog) -> AssembledSetlist {
        assemble(self.song_ids().iter().cloned(), catalog)
    }
}
