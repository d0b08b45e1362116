use anyhow::{Context, Result};
use bandbook_ai::{ChatCompletionsClient, SuggestRequest, Suggester, Suggestion};
use bandbook_core::access::require_core;
use serde::Serialize;

use super::Session;
use crate::output;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SuggestionView<'a> {
    name: &'a str,
    songs: &'a [bandbook_core::setlist::SetlistEntry],
    explanation: Option<&'a str>,
    metrics: &'a bandbook_core::setlist::SetlistMetrics,
    dropped: usize,
    saved_as: Option<String>,
}

pub async fn run(session: &Session, request: &SuggestRequest, save: bool) -> Result<()> {
    require_core(&session.principal)?;

    let client = ChatCompletionsClient::new(&session.config)
        .context("Cannot reach the text-generation service")?;
    log::info!("Using model {}", client.model());

    let suggester = Suggester::new(client, session.config.target_language);
    let suggestion = suggester
        .suggest_from_store(request, &session.store)
        .await?;

    let saved_as = if save {
        Some(save_suggestion(session, &request.name, suggestion.clone())?)
    } else {
        None
    };

    if session.json {
        return output::print_json(&SuggestionView {
            name: &request.name,
            songs: &suggestion.setlist.entries,
            explanation: suggestion.explanation.as_deref(),
            metrics: &suggestion.metrics,
            dropped: suggestion.dropped(),
            saved_as,
        });
    }

    println!("Suggested setlist: {}", request.name);
    if let Some(explanation) = &suggestion.explanation {
        println!("  {explanation}");
    }
    println!();
    output::print_assembled(&suggestion.setlist);
    output::print_metrics(&suggestion.metrics);
    if suggestion.dropped() > 0 {
        println!(
            "\n  {} suggested song(s) were not in the catalog or repeated and were left out.",
            suggestion.dropped()
        );
    }
    match saved_as {
        Some(id) => println!("\n✓ Saved as setlist {id}"),
        None => println!("\nRun again with --save to keep it."),
    }
    Ok(())
}

fn save_suggestion(session: &Session, name: &str, suggestion: Suggestion) -> Result<String> {
    let setlist = suggestion.into_setlist(name, Some(session.principal.user_id.clone()));
    session.store.insert(&setlist)?;
    log::info!("Saved generated setlist {}", setlist.id);
    Ok(setlist.id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bandbook_core::access::Principal;
    use bandbook_core::model::{Setlist, SetlistOrigin, Song};
    use bandbook_core::setlist::{assemble, SongCatalog};
    use bandbook_core::store::Store;

    #[test]
    fn test_save_suggestion_marks_origin() {
        let session = Session::with_store(Store::open_in_memory().unwrap(), Principal::admin("a"));
        let catalog = SongCatalog::from_songs([Song::new("A", "X").with_id("A")]);
        let setlist = assemble(["A"].map(bandbook_core::model::SongId::from), &catalog);
        let suggestion = Suggestion {
            metrics: setlist.metrics(session.config.target_language),
            setlist,
            explanation: Some("short".to_string()),
            malformed: 0,
        };

        let id = save_suggestion(&session, "Gen", suggestion).unwrap();
        let saved: Setlist = session.store.require(&id).unwrap();
        assert_eq!(saved.metadata.origin, SetlistOrigin::Generated);
        assert_eq!(saved.created_by.unwrap().as_str(), "a");
    }

    #[tokio::test]
    async fn test_missing_api_key_is_reported() {
        let session = Session::with_store(Store::open_in_memory().unwrap(), Principal::admin("a"));
        let err = run(&session, &SuggestRequest::new("x"), false)
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("API key"));
    }
}
