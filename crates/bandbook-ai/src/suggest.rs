//! AI-assisted setlist suggestions.
//!
//! The generator's answer is untrusted: it may be wrapped in Markdown,
//! reference songs that do not exist, or repeat itself. Everything it
//! proposes goes through the same assembler as a hand-built set, so the
//! result obeys the same invariants.

use bandbook_core::model::{Language, Setlist, SetlistMetadata, SetlistOrigin, UserId};
use bandbook_core::setlist::{
    assemble, AssembledSetlist, CandidateItem, SetlistMetrics, SongCatalog,
};
use bandbook_core::store::Store;
use serde_json::Value;

use crate::client::TextGenerator;
use crate::error::{AiError, AiResult};
use crate::prompt::{build_prompt, SuggestRequest, SYSTEM_PROMPT};

const SOURCE_NAME: &str = "suggestion";

/// The generator's answer after validation, before assembly.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedSuggestion {
    pub candidates: Vec<CandidateItem>,
    pub explanation: Option<String>,
    /// Items in the `songs` array that had no usable id.
    pub malformed: usize,
}

fn parse_error(message: impl Into<String>) -> AiError {
    AiError::Parse {
        source_name: SOURCE_NAME.to_string(),
        message: message.into(),
    }
}

/// Body of the first Markdown code fence, without its language tag.
fn fenced_block(text: &str) -> Option<&str> {
    let after_open = &text[text.find("```")? + 3..];
    let body = &after_open[after_open.find('\n')? + 1..];
    Some(&body[..body.find("```")?])
}

/// JSON objects found in `text`, trying every `{` as a start.
fn json_objects(text: &str) -> impl Iterator<Item = Value> + '_ {
    text.match_indices('{').filter_map(|(start, _)| {
        serde_json::Deserializer::from_str(&text[start..])
            .into_iter::<Value>()
            .next()
            .and_then(Result::ok)
            .filter(Value::is_object)
    })
}

/// Find the reply's JSON object among code fences and surrounding prose.
///
/// A fenced block wins over loose text; among candidates, one that carries a
/// `songs` key wins over one that does not.
fn json_body(text: &str) -> Option<Value> {
    let fenced = fenced_block(text).into_iter().flat_map(json_objects);
    let mut found = fenced.chain(json_objects(text));
    let first = found.next()?;
    if first.get("songs").is_some() {
        return Some(first);
    }
    found.find(|v| v.get("songs").is_some()).or(Some(first))
}

fn candidate_from(value: Value) -> Option<CandidateItem> {
    match value {
        Value::String(id) if !id.trim().is_empty() => Some(CandidateItem::new(id.trim())),
        Value::Object(_) => serde_json::from_value::<CandidateItem>(value)
            .ok()
            .filter(|c| !c.id.as_str().trim().is_empty()),
        _ => None,
    }
}

/// Parse a generator reply of the form
/// `{"songs":[{"id":..,"reasoning":..}, ..], "explanation": ..}`.
///
/// Bare string ids in `songs` are accepted. Items without an id are skipped
/// and counted in [`ParsedSuggestion::malformed`].
///
/// # Errors
///
/// Returns [`AiError::Parse`] when no well-formed JSON object can be found
/// or the object has no `songs` array.
pub fn parse_suggestion(text: &str) -> AiResult<ParsedSuggestion> {
    let mut root = json_body(text).ok_or_else(|| parse_error("reply contains no JSON object"))?;

    let Some(Value::Array(songs)) = root.get_mut("songs").map(Value::take) else {
        return Err(parse_error("reply has no \"songs\" array"));
    };

    let explanation = root
        .get("explanation")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let total = songs.len();
    let candidates: Vec<CandidateItem> = songs.into_iter().filter_map(candidate_from).collect();
    let malformed = total - candidates.len();
    if malformed > 0 {
        log::debug!("Skipped {malformed} malformed song item(s) in suggestion");
    }

    Ok(ParsedSuggestion {
        candidates,
        explanation,
        malformed,
    })
}

/// A validated, assembled suggestion.
#[derive(Debug, Clone)]
pub struct Suggestion {
    pub setlist: AssembledSetlist,
    pub explanation: Option<String>,
    pub metrics: SetlistMetrics,
    /// Items the generator returned without a usable id.
    pub malformed: usize,
}

impl Suggestion {
    /// References dropped for any reason: malformed, unknown, or repeated.
    pub fn dropped(&self) -> usize {
        self.malformed + self.setlist.report.dropped()
    }

    /// Turn the suggestion into a storable setlist marked as generated.
    pub fn into_setlist(self, name: impl Into<String>, created_by: Option<UserId>) -> Setlist {
        let mut setlist = Setlist::new(name)
            .with_songs(self.setlist.song_ids())
            .with_metadata(SetlistMetadata {
                notes: None,
                origin: SetlistOrigin::Generated,
                explanation: self.explanation,
            });
        setlist.created_by = created_by;
        setlist
    }
}

/// Asks a [`TextGenerator`] for a running order and validates the answer.
#[derive(Debug)]
pub struct Suggester<G> {
    generator: G,
    target_language: Language,
}

impl<G: TextGenerator> Suggester<G> {
    pub fn new(generator: G, target_language: Language) -> Self {
        Self {
            generator,
            target_language,
        }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Request a suggestion for `request` drawn from `catalog`.
    ///
    /// # Errors
    ///
    /// - [`AiError::EmptyCatalog`] if there is nothing to choose from.
    /// - Any error from the generator or from [`parse_suggestion`].
    /// - [`AiError::EmptySuggestion`] if no proposed song survives assembly.
    pub async fn suggest(
        &self,
        request: &SuggestRequest,
        catalog: &SongCatalog,
    ) -> AiResult<Suggestion> {
        if catalog.is_empty() {
            return Err(AiError::EmptyCatalog);
        }

        let prompt = build_prompt(request, catalog);
        log::info!(
            "Requesting suggestion \"{}\" over {} catalog songs",
            request.name,
            catalog.len()
        );
        let reply = self.generator.generate(SYSTEM_PROMPT, &prompt).await?;

        let parsed = parse_suggestion(&reply)?;
        let setlist = assemble(parsed.candidates, catalog);
        let dropped = parsed.malformed + setlist.report.dropped();

        if setlist.is_empty() {
            return Err(AiError::EmptySuggestion { dropped });
        }
        if dropped > 0 {
            log::warn!(
                "Suggestion kept {} song(s); dropped {} unknown, {} repeated, {} malformed",
                setlist.len(),
                setlist.report.unresolved.len(),
                setlist.report.duplicates.len(),
                parsed.malformed
            );
        }

        let metrics = setlist.metrics(self.target_language);
        Ok(Suggestion {
            setlist,
            explanation: parsed.explanation,
            metrics,
            malformed: parsed.malformed,
        })
    }

    /// Like [`Suggester::suggest`], over the store's current catalog.
    ///
    /// # Errors
    ///
    /// [`AiError::Store`] if the catalog cannot be read, otherwise as for
    /// [`Suggester::suggest`].
    pub async fn suggest_from_store(
        &self,
        request: &SuggestRequest,
        store: &Store,
    ) -> AiResult<Suggestion> {
        let catalog = store.catalog()?;
        self.suggest(request, &catalog).await
    }
}
