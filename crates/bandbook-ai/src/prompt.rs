//! Prompt construction for setlist suggestions.

use bandbook_core::model::{Language, Song};
use bandbook_core::setlist::SongCatalog;
use serde::{Deserialize, Serialize};

/// Instructions sent as the system message of every suggestion request.
pub const SYSTEM_PROMPT: &str = "You are the musical director of a cover band. \
You build setlists only from the songs in the catalog you are given, \
referring to each song by its exact id. Never invent songs and never use \
a song twice. Answer with a single JSON object and nothing else.";

/// The operator's constraints for one suggested setlist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestRequest {
    pub name: String,
    #[serde(default)]
    pub target_minutes: Option<u32>,
    #[serde(default)]
    pub song_count: Option<usize>,
    #[serde(default)]
    pub preferred_language: Option<Language>,
    /// Free-text description of the energy curve, e.g. "start high, dip mid-set".
    #[serde(default)]
    pub energy_arc: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl SuggestRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_target_minutes(mut self, minutes: u32) -> Self {
        self.target_minutes = Some(minutes);
        self
    }

    #[must_use]
    pub fn with_song_count(mut self, count: usize) -> Self {
        self.song_count = Some(count);
        self
    }

    #[must_use]
    pub fn with_preferred_language(mut self, language: Language) -> Self {
        self.preferred_language = Some(language);
        self
    }

    #[must_use]
    pub fn with_energy_arc(mut self, arc: impl Into<String>) -> Self {
        self.energy_arc = Some(arc.into());
        self
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

fn catalog_line(song: &Song) -> String {
    let duration = song
        .duration
        .map_or_else(|| "?".to_string(), |d| d.to_string());
    let mut line = format!(
        "- id={} | {} - {} | key={} | duration={} | language={} | vocalist={} | energy={}",
        song.id,
        song.title,
        song.artist,
        song.key.as_deref().unwrap_or("?"),
        duration,
        song.language,
        song.vocalist,
        song.energy,
    );
    if let Some(bass) = &song.bass_guitar {
        line.push_str(" | bass=");
        line.push_str(bass);
    }
    if let Some(guitar) = &song.guitar {
        line.push_str(" | guitar=");
        line.push_str(guitar);
    }
    if let Some(medley) = &song.medley {
        line.push_str(" | medley=");
        line.push_str(medley);
        if let Some(pos) = song.medley_position {
            line.push('#');
            line.push_str(&pos.to_string());
        }
    }
    if !song.tags.is_empty() {
        line.push_str(" | tags=");
        line.push_str(&song.tags.join(","));
    }
    line
}

/// Render the user message: constraints, catalog, and the expected answer shape.
pub fn build_prompt(request: &SuggestRequest, catalog: &SongCatalog) -> String {
    let mut lines = vec![format!("Build a setlist called \"{}\".", request.name)];

    if let Some(minutes) = request.target_minutes {
        lines.push(format!("Target total playing time: about {minutes} minutes."));
    }
    if let Some(count) = request.song_count {
        lines.push(format!("Use about {count} songs."));
    }
    if let Some(language) = request.preferred_language {
        lines.push(format!("Favour {language} songs."));
    }
    if let Some(arc) = &request.energy_arc {
        lines.push(format!("Energy arc: {arc}."));
    }
    if let Some(notes) = &request.notes {
        lines.push(format!("Notes: {notes}"));
    }
    lines.push(
        "Keep songs of the same medley together in medley order, and try to \
         limit bass and guitar changes between consecutive songs."
            .to_string(),
    );

    lines.push(String::new());
    lines.push(format!("Catalog ({} songs):", catalog.len()));
    lines.extend(catalog.iter().map(catalog_line));

    lines.push(String::new());
    lines.push(
        "Respond with JSON of the form \
         {\"songs\":[{\"id\":\"<song id>\",\"reasoning\":\"<why here>\"}],\
         \"explanation\":\"<overall rationale>\"} with songs in playing order."
            .to_string(),
    );

    lines.join("\n")
}
