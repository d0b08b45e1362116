use anyhow::{bail, Result};
use bandbook_core::access::require_core;
use bandbook_core::model::{Song, SongFilter};

use super::Session;
use crate::output;
use crate::SongFields;

fn apply_fields(song: &mut Song, fields: SongFields) {
    if let Some(key) = fields.key {
        song.key = Some(key);
    }
    if let Some(duration) = fields.duration {
        song.duration = Some(duration);
    }
    if let Some(language) = fields.language {
        song.language = language;
    }
    if let Some(vocalist) = fields.vocalist {
        song.vocalist = vocalist;
    }
    if let Some(energy) = fields.energy {
        song.energy = energy;
    }
    if let Some(bass) = fields.bass {
        song.bass_guitar = Some(bass);
    }
    if let Some(guitar) = fields.guitar {
        song.guitar = Some(guitar);
    }
    for tag in fields.tags {
        if !song.has_tag(&tag) {
            song.tags.push(tag);
        }
    }
    if let Some(medley) = fields.medley {
        song.medley = Some(medley);
        song.medley_position = fields.medley_position;
    }
}

pub fn add(session: &Session, title: String, artist: String, fields: SongFields) -> Result<()> {
    require_core(&session.principal)?;
    if title.trim().is_empty() {
        bail!("Song title must not be empty");
    }

    let mut song = Song::new(title, artist);
    apply_fields(&mut song, fields);
    session.store.insert(&song)?;
    log::info!("Added song {} ({})", song.id, song.title);

    if session.json {
        return output::print_json(&song);
    }
    println!("✓ Added {}", output::song_line(&song));
    Ok(())
}

pub fn list(session: &Session, filter: &SongFilter) -> Result<()> {
    let songs: Vec<Song> = session
        .store
        .songs()?
        .into_iter()
        .filter(|s| filter.matches(s))
        .collect();

    if session.json {
        return output::print_json(&songs);
    }
    if songs.is_empty() {
        println!("No songs found.");
        return Ok(());
    }
    for song in &songs {
        println!("{}", output::song_line(song));
    }
    println!("\n{} song(s)", songs.len());
    Ok(())
}

pub fn show(session: &Session, id: &str) -> Result<()> {
    let song: Song = session.store.require(id)?;
    if session.json {
        return output::print_json(&song);
    }
    output::print_song(&song);
    Ok(())
}

pub fn edit(
    session: &Session,
    id: &str,
    title: Option<String>,
    artist: Option<String>,
    fields: SongFields,
) -> Result<()> {
    require_core(&session.principal)?;

    let song = session.store.modify::<Song, _>(id, |song| {
        if let Some(title) = title {
            song.title = title;
        }
        if let Some(artist) = artist {
            song.artist = artist;
        }
        apply_fields(song, fields);
        song.touch();
        Ok(())
    })?;

    if session.json {
        return output::print_json(&song);
    }
    println!("✓ Updated {}", output::song_line(&song));
    Ok(())
}

pub fn remove(session: &Session, id: &str) -> Result<()> {
    require_core(&session.principal)?;
    if !session.store.delete::<Song>(id)? {
        bail!("No song with id {id}");
    }
    println!("✓ Removed song {id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bandbook_core::access::Principal;
    use bandbook_core::model::{BandMember, Energy, Language, SongDuration};
    use bandbook_core::store::Store;

    fn admin_session() -> Session {
        Session::with_store(Store::open_in_memory().unwrap(), Principal::admin("admin"))
    }

    #[test]
    fn test_apply_fields() {
        let mut song = Song::new("T", "A").with_tag("opener");
        apply_fields(
            &mut song,
            SongFields {
                duration: Some(SongDuration::from_secs(200)),
                language: Some(Language::Danish),
                energy: Some(Energy::High),
                tags: vec!["opener".to_string(), "party".to_string()],
                medley: Some("Disco".to_string()),
                medley_position: Some(2),
                ..SongFields::default()
            },
        );
        assert_eq!(song.duration, Some(SongDuration::from_secs(200)));
        assert_eq!(song.language, Language::Danish);
        assert_eq!(song.tags, ["opener", "party"]);
        assert_eq!(song.medley_position, Some(2));
    }

    #[test]
    fn test_add_and_edit() {
        let session = admin_session();
        add(
            &session,
            "Title".to_string(),
            "Artist".to_string(),
            SongFields::default(),
        )
        .unwrap();
        let songs = session.store.songs().unwrap();
        assert_eq!(songs.len(), 1);

        let id = songs[0].id.to_string();
        edit(
            &session,
            &id,
            Some("New Title".to_string()),
            None,
            SongFields::default(),
        )
        .unwrap();
        let song: Song = session.store.require(&id).unwrap();
        assert_eq!(song.title, "New Title");
        assert_eq!(song.artist, "Artist");

        remove(&session, &id).unwrap();
        assert!(remove(&session, &id).is_err());
    }

    #[test]
    fn test_replacement_members_cannot_edit_catalog() {
        let session = Session::with_store(
            Store::open_in_memory().unwrap(),
            Principal::member("u", BandMember::new("Sub", "drums")),
        );
        let result = add(
            &session,
            "T".to_string(),
            "A".to_string(),
            SongFields::default(),
        );
        assert!(result.is_err());
    }
}
