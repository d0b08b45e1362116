//! End-to-end checks against an on-disk store.

use bandbook_core::availability::{aggregate, month_overview, DateStatus};
use bandbook_core::model::{
    AvailabilityEntry, AvailabilityStatus, BandMember, DayKey, Language, Setlist, Song,
    SongDuration, SongId,
};
use bandbook_core::setlist::{assemble, CandidateItem};
use bandbook_core::store::Store;
use bandbook_core::Error;
use tempfile::TempDir;

fn open_store(dir: &TempDir) -> Store {
    Store::open(dir.path().join("band.db")).unwrap()
}

fn seed_roster(store: &Store) {
    for (id, name) in [("m1", "Rikke"), ("m2", "Jens"), ("m3", "Ole")] {
        store
            .insert(&BandMember::new(name, "guitar").with_id(id).core())
            .unwrap();
    }
    store
        .insert(&BandMember::new("Sub", "drums").with_id("m9"))
        .unwrap();
}

fn day_status(store: &Store, day: DayKey) -> DateStatus {
    aggregate(
        &store.core_members().unwrap(),
        &store.entries_for_day(day).unwrap(),
    )
}

#[test]
fn test_day_status_follows_answers() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    seed_roster(&store);
    let day: DayKey = "14-03-2026".parse().unwrap();

    for member in ["m1", "m2"] {
        store
            .set_availability(&AvailabilityEntry::new(
                day,
                member,
                AvailabilityStatus::Available,
            ))
            .unwrap();
    }
    // A replacement's answer does not complete the roster.
    store
        .set_availability(&AvailabilityEntry::new(
            day,
            "m9",
            AvailabilityStatus::Available,
        ))
        .unwrap();
    assert_eq!(day_status(&store, day), DateStatus::Unknown);

    store
        .set_availability(&AvailabilityEntry::new(day, "m3", AvailabilityStatus::Maybe))
        .unwrap();
    assert_eq!(day_status(&store, day), DateStatus::Partial);

    store
        .set_availability(
            &AvailabilityEntry::new(day, "m3", AvailabilityStatus::Unavailable)
                .with_comment("wedding"),
        )
        .unwrap();
    assert_eq!(day_status(&store, day), DateStatus::Conflict);
    assert_eq!(store.entries_for_day(day).unwrap().len(), 4);

    let entries: Vec<AvailabilityEntry> = store.list().unwrap();
    let march = month_overview(2026, 3, &store.core_members().unwrap(), &entries).unwrap();
    assert_eq!(march.len(), 31);
    assert_eq!(march[13].status, DateStatus::Conflict);
    assert_eq!(march[0].status, DateStatus::Unknown);
}

#[test]
fn test_setlist_round_trip_through_store() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    for (id, secs) in [("A", 200), ("B", 160), ("C", 240)] {
        store
            .insert(
                &Song::new(id, "Band")
                    .with_id(id)
                    .with_duration(SongDuration::from_secs(secs))
                    .with_language(Language::Danish),
            )
            .unwrap();
    }

    let catalog = store.catalog().unwrap();
    let assembled = assemble(
        [
            CandidateItem::new("A"),
            CandidateItem::new("B"),
            CandidateItem::new("A"),
            CandidateItem::new("C").with_field("reasoning", "closer".into()),
        ],
        &catalog,
    );
    assert_eq!(assembled.len(), 3);
    assert_eq!(assembled.report.duplicates, vec![SongId::from("A")]);
    assert_eq!(
        assembled.entries[2].annotations["reasoning"].as_str(),
        Some("closer")
    );

    let setlist = Setlist::new("Friday")
        .with_id("set-1")
        .with_songs(assembled.song_ids());
    store.insert(&setlist).unwrap();

    // Deleting a song leaves the stored reference but drops it on read.
    store.delete::<Song>("B").unwrap();
    let saved: Setlist = store.require("set-1").unwrap();
    assert_eq!(saved.song_ids().len(), 3);

    let hydrated = saved.hydrate(&store.catalog().unwrap());
    let titles: Vec<&str> = hydrated.songs().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, ["A", "C"]);
    assert_eq!(hydrated.report.unresolved, vec![SongId::from("B")]);

    let metrics = hydrated.metrics(Language::Danish);
    assert!((metrics.total_minutes - 440.0 / 60.0).abs() < 1e-9);
    assert_eq!(metrics.language_mix, 100);
}

#[test]
fn test_stale_update_is_a_conflict() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.insert(&Setlist::new("Main").with_id("set-1")).unwrap();

    let first = store.get_versioned::<Setlist>("set-1").unwrap().unwrap();
    let second = store.get_versioned::<Setlist>("set-1").unwrap().unwrap();

    let mut winner = first.record;
    winner.push_song("A");
    store.update(&winner, first.version).unwrap();

    let mut loser = second.record;
    loser.push_song("B");
    let err = store.update(&loser, second.version).unwrap_err();
    assert!(matches!(err, Error::Conflict { .. }));

    let saved: Setlist = store.require("set-1").unwrap();
    assert_eq!(saved.song_ids(), [SongId::from("A")]);

    assert!(matches!(
        store.insert(&Setlist::new("Again").with_id("set-1")),
        Err(Error::Conflict { .. })
    ));
}

#[test]
fn test_records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let store = open_store(&dir);
        seed_roster(&store);
        store.insert(&Song::new("Kom", "Band").with_id("s1")).unwrap();
    }

    let store = open_store(&dir);
    assert_eq!(store.count::<BandMember>().unwrap(), 4);
    assert_eq!(store.core_members().unwrap().len(), 3);
    assert_eq!(store.songs().unwrap()[0].title, "Kom");
}
