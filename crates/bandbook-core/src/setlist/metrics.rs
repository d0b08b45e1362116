//! Summary figures for an assembled setlist.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::model::{Energy, Language, Song, Vocalist};

/// Adjacent songs that need a different instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct InstrumentChanges {
    pub bass: usize,
    pub guitar: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetlistMetrics {
    pub song_count: usize,
    pub total_minutes: f64,
    pub target_language: Language,
    /// Share of songs in `target_language`, 0-100.
    pub language_mix: u32,
    pub energy_distribution: BTreeMap<Energy, usize>,
    pub singer_balance: BTreeMap<Vocalist, usize>,
    pub instrument_changes: InstrumentChanges,
}

impl SetlistMetrics {
    pub fn compute<'a>(songs: impl IntoIterator<Item = &'a Song>, target_language: Language) -> Self {
        let songs: Vec<&Song> = songs.into_iter().collect();
        Self {
            song_count: songs.len(),
            total_minutes: total_minutes(songs.iter().copied()),
            target_language,
            language_mix: language_mix(songs.iter().copied(), target_language),
            energy_distribution: energy_distribution(songs.iter().copied()),
            singer_balance: singer_balance(songs.iter().copied()),
            instrument_changes: instrument_changes(songs.iter().copied()),
        }
    }
}

/// Sum of durations in minutes. Songs without a duration count as zero.
pub fn total_minutes<'a>(songs: impl IntoIterator<Item = &'a Song>) -> f64 {
    songs
        .into_iter()
        .filter_map(|s| s.duration)
        .map(|d| d.as_minutes())
        .sum()
}

/// Percentage of songs in `target`, rounded to the nearest integer.
pub fn language_mix<'a>(songs: impl IntoIterator<Item = &'a Song>, target: Language) -> u32 {
    let (total, matching) = songs.into_iter().fold((0usize, 0usize), |(total, matching), s| {
        (total + 1, matching + usize::from(s.language == target))
    });
    if total == 0 {
        return 0;
    }
    (matching as f64 * 100.0 / total as f64).round() as u32
}

pub fn energy_distribution<'a>(songs: impl IntoIterator<Item = &'a Song>) -> BTreeMap<Energy, usize> {
    let mut counts = BTreeMap::new();
    for song in songs {
        *counts.entry(song.energy).or_insert(0) += 1;
    }
    counts
}

pub fn singer_balance<'a>(songs: impl IntoIterator<Item = &'a Song>) -> BTreeMap<Vocalist, usize> {
    let mut counts = BTreeMap::new();
    for song in songs {
        *counts.entry(song.vocalist).or_insert(0) += 1;
    }
    counts
}

/// Count transitions between neighbouring songs where the bass or guitar differs.
pub fn instrument_changes<'a>(songs: impl IntoIterator<Item = &'a Song>) -> InstrumentChanges {
    let songs: Vec<&Song> = songs.into_iter().collect();
    songs
        .windows(2)
        .fold(InstrumentChanges::default(), |mut acc, pair| {
            if pair[0].bass_guitar != pair[1].bass_guitar {
                acc.bass += 1;
            }
            if pair[0].guitar != pair[1].guitar {
                acc.guitar += 1;
            }
            acc
        })
}
