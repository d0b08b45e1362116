use anyhow::{bail, Result};
use bandbook_core::access::require_core;
use bandbook_core::model::{Setlist, SetlistMetadata, SongId};
use bandbook_core::setlist::{assemble, SongCatalog};
use bandbook_core::Error;
use serde::Serialize;

use super::Session;
use crate::output;

/// Keep the ids that name catalog songs, warning about the rest.
fn known_ids(catalog: &SongCatalog, songs: Vec<String>) -> Vec<SongId> {
    let assembled = assemble(songs.into_iter().map(SongId::from), catalog);
    for id in &assembled.report.unresolved {
        log::warn!("Skipping unknown song {id}");
    }
    for id in &assembled.report.duplicates {
        log::warn!("Skipping repeated song {id}");
    }
    assembled.song_ids()
}

pub fn create(
    session: &Session,
    name: String,
    songs: Vec<String>,
    notes: Option<String>,
) -> Result<()> {
    require_core(&session.principal)?;
    let catalog = session.store.catalog()?;

    let setlist = Setlist::new(name)
        .with_songs(known_ids(&catalog, songs))
        .created_by(session.principal.user_id.clone())
        .with_metadata(SetlistMetadata {
            notes,
            ..SetlistMetadata::default()
        });
    session.store.insert(&setlist)?;
    log::info!("Created setlist {} ({})", setlist.id, setlist.name);

    if session.json {
        return output::print_json(&setlist);
    }
    println!(
        "✓ Created setlist {} with {} song(s)",
        setlist.id,
        setlist.song_ids().len()
    );
    Ok(())
}

pub fn list(session: &Session) -> Result<()> {
    let setlists = session.store.list::<Setlist>()?;
    if session.json {
        return output::print_json(&setlists);
    }
    if setlists.is_empty() {
        println!("No setlists yet.");
        return Ok(());
    }
    for setlist in &setlists {
        println!(
            "{:<16} {:<30} {:>3} song(s)  {}",
            setlist.id.as_str(),
            setlist.name,
            setlist.song_ids().len(),
            setlist.metadata.origin
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct SetlistView<'a> {
    #[serde(flatten)]
    setlist: &'a Setlist,
    songs: &'a [bandbook_core::setlist::SetlistEntry],
    metrics: bandbook_core::setlist::SetlistMetrics,
}

pub fn show(session: &Session, id: &str) -> Result<()> {
    let setlist: Setlist = session.store.require(id)?;
    let hydrated = setlist.hydrate(&session.store.catalog()?);
    let metrics = hydrated.metrics(session.config.target_language);

    if session.json {
        return output::print_json(&SetlistView {
            setlist: &setlist,
            songs: &hydrated.entries,
            metrics,
        });
    }

    println!("{} ({})", setlist.name, setlist.id);
    if let Some(notes) = &setlist.metadata.notes {
        println!("  {notes}");
    }
    if let Some(explanation) = &setlist.metadata.explanation {
        println!("  {explanation}");
    }
    println!();
    output::print_assembled(&hydrated);
    output::print_metrics(&metrics);
    Ok(())
}

pub fn add(session: &Session, id: &str, songs: Vec<String>) -> Result<()> {
    require_core(&session.principal)?;
    let catalog = session.store.catalog()?;
    let wanted = known_ids(&catalog, songs);

    let mut skipped = 0;
    let setlist = session.store.modify::<Setlist, _>(id, |setlist| {
        for song in wanted {
            if !setlist.push_song(song) {
                skipped += 1;
            }
        }
        setlist.touch();
        Ok(())
    })?;
    if skipped > 0 {
        println!("({skipped} song(s) were already in the set)");
    }
    println!(
        "✓ {} now has {} song(s)",
        setlist.name,
        setlist.song_ids().len()
    );
    Ok(())
}

pub fn drop_song(session: &Session, id: &str, song: &str) -> Result<()> {
    require_core(&session.principal)?;
    let song_id = SongId::from(song);

    session.store.modify::<Setlist, _>(id, |setlist| {
        if !setlist.remove_song(&song_id) {
            return Err(Error::NotFound {
                entity: "song in setlist",
                id: song_id.to_string(),
            });
        }
        setlist.touch();
        Ok(())
    })?;
    println!("✓ Removed {song} from {id}");
    Ok(())
}

pub fn reorder(session: &Session, id: &str, songs: Vec<String>) -> Result<()> {
    require_core(&session.principal)?;
    let catalog = session.store.catalog()?;
    let order = known_ids(&catalog, songs);

    let setlist = session.store.modify::<Setlist, _>(id, |setlist| {
        setlist.set_songs(order);
        setlist.touch();
        Ok(())
    })?;
    println!(
        "✓ {} reordered ({} song(s))",
        setlist.name,
        setlist.song_ids().len()
    );
    Ok(())
}

/// Gigs that list the setlist keep the dangling id; it is skipped on read.
pub fn remove(session: &Session, id: &str) -> Result<()> {
    require_core(&session.principal)?;
    if !session.store.delete::<Setlist>(id)? {
        bail!("No setlist with id {id}");
    }
    println!("✓ Removed setlist {id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bandbook_core::access::Principal;
    use bandbook_core::model::Song;
    use bandbook_core::store::Store;

    fn session() -> Session {
        let store = Store::open_in_memory().unwrap();
        for id in ["A", "B", "C"] {
            store.insert(&Song::new(id, "Band").with_id(id)).unwrap();
        }
        Session::with_store(store, Principal::admin("admin"))
    }

    fn ids(setlist: &Setlist) -> Vec<&str> {
        setlist.song_ids().iter().map(SongId::as_str).collect()
    }

    fn only_setlist(session: &Session) -> Setlist {
        let mut all = session.store.list::<Setlist>().unwrap();
        assert_eq!(all.len(), 1);
        all.remove(0)
    }

    #[test]
    fn test_create_drops_unknown_and_repeated_songs() {
        let session = session();
        let songs = ["A", "B", "A", "Z", "C"].map(String::from).to_vec();
        create(&session, "Friday".to_string(), songs, None).unwrap();

        let setlist = only_setlist(&session);
        assert_eq!(ids(&setlist), ["A", "B", "C"]);
        assert_eq!(setlist.created_by.as_ref().unwrap().as_str(), "admin");
    }

    #[test]
    fn test_add_drop_reorder() {
        let session = session();
        create(&session, "Set".to_string(), vec!["A".to_string()], None).unwrap();
        let id = only_setlist(&session).id.to_string();

        add(&session, &id, vec!["B".to_string(), "A".to_string(), "C".to_string()]).unwrap();
        assert_eq!(ids(&only_setlist(&session)), ["A", "B", "C"]);

        drop_song(&session, &id, "B").unwrap();
        assert_eq!(ids(&only_setlist(&session)), ["A", "C"]);
        assert!(drop_song(&session, &id, "B").is_err());

        reorder(&session, &id, vec!["C".to_string(), "A".to_string()]).unwrap();
        assert_eq!(ids(&only_setlist(&session)), ["C", "A"]);

        remove(&session, &id).unwrap();
        assert!(session.store.list::<Setlist>().unwrap().is_empty());
    }

    #[test]
    fn test_drop_missing_song_writes_nothing() {
        let session = session();
        create(&session, "Set".to_string(), vec!["A".to_string()], None).unwrap();
        let id = only_setlist(&session).id.to_string();
        let before = session.store.get_versioned::<Setlist>(&id).unwrap().unwrap();

        let err = drop_song(&session, &id, "C").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::NotFound { .. })
        ));

        let after = session.store.get_versioned::<Setlist>(&id).unwrap().unwrap();
        assert_eq!(after.version, before.version);
        assert_eq!(after.record.updated_at, before.record.updated_at);
    }

    #[test]
    fn test_show_survives_deleted_song() {
        let session = session();
        create(&session, "Set".to_string(), vec!["A".to_string(), "B".to_string()], None).unwrap();
        let id = only_setlist(&session).id.to_string();
        session.store.delete::<Song>("A").unwrap();
        show(&session, &id).unwrap();
    }
}
