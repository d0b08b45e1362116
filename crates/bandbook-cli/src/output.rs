//! Text rendering for command output.

use anyhow::Result;
use bandbook_core::availability::{DateStatus, DayOverview};
use bandbook_core::model::{Gig, Song};
use bandbook_core::setlist::{AssembledSetlist, SetlistMetrics};
use serde::Serialize;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn status_marker(status: DateStatus) -> &'static str {
    match status {
        DateStatus::Full => "✓",
        DateStatus::Partial => "~",
        DateStatus::Conflict => "✗",
        DateStatus::Unknown => "?",
    }
}

pub fn song_line(song: &Song) -> String {
    let duration = song
        .duration
        .map_or_else(|| "-:--".to_string(), |d| d.to_string());
    format!(
        "{:<16} {:>5}  {} - {}  [{}, {}, {}]",
        song.id.as_str(),
        duration,
        song.title,
        song.artist,
        song.language,
        song.vocalist,
        song.energy
    )
}

pub fn print_song(song: &Song) {
    println!("{} - {}", song.title, song.artist);
    println!("  id:        {}", song.id);
    if let Some(key) = &song.key {
        println!("  key:       {key}");
    }
    if let Some(duration) = song.duration {
        println!("  duration:  {duration}");
    }
    println!("  language:  {}", song.language);
    println!("  vocalist:  {}", song.vocalist);
    println!("  energy:    {}", song.energy);
    if let Some(bass) = &song.bass_guitar {
        println!("  bass:      {bass}");
    }
    if let Some(guitar) = &song.guitar {
        println!("  guitar:    {guitar}");
    }
    if !song.tags.is_empty() {
        println!("  tags:      {}", song.tags.join(", "));
    }
    if let Some(medley) = &song.medley {
        match song.medley_position {
            Some(pos) => println!("  medley:    {medley} (#{pos})"),
            None => println!("  medley:    {medley}"),
        }
    }
}

pub fn print_assembled(setlist: &AssembledSetlist) {
    for entry in &setlist.entries {
        println!("  {:>2}. {}", entry.position, song_line(&entry.song));
        if let Some(reason) = entry.annotations.get("reasoning").and_then(|v| v.as_str()) {
            println!("      {reason}");
        }
    }
    let report = &setlist.report;
    if !report.unresolved.is_empty() {
        let ids: Vec<&str> = report.unresolved.iter().map(|id| id.as_str()).collect();
        println!("  (skipped missing songs: {})", ids.join(", "));
    }
}

pub fn print_metrics(metrics: &SetlistMetrics) {
    println!();
    println!("  Songs:             {}", metrics.song_count);
    println!("  Total time:        {:.1} min", metrics.total_minutes);
    println!(
        "  {} songs:    {}%",
        metrics.target_language, metrics.language_mix
    );
    let energy: Vec<String> = metrics
        .energy_distribution
        .iter()
        .map(|(e, n)| format!("{e} {n}"))
        .collect();
    println!("  Energy:            {}", energy.join(", "));
    let singers: Vec<String> = metrics
        .singer_balance
        .iter()
        .map(|(v, n)| format!("{v} {n}"))
        .collect();
    println!("  Singers:           {}", singers.join(", "));
    println!(
        "  Instrument swaps:  bass {}, guitar {}",
        metrics.instrument_changes.bass, metrics.instrument_changes.guitar
    );
}

pub fn print_day(overview: &DayOverview, names: &dyn Fn(&str) -> String) {
    println!(
        "{} {} {}",
        status_marker(overview.status),
        overview.day,
        overview.status
    );
    for (member_id, answer) in &overview.responses {
        let answer = answer.map_or_else(|| "no answer".to_string(), |a| a.to_string());
        println!("    {:<20} {answer}", names(member_id.as_str()));
    }
}

pub fn gig_line(gig: &Gig) -> String {
    format!(
        "{:<16} {}  {:<10} {} @ {}",
        gig.id.as_str(),
        gig.date,
        gig.status.to_string(),
        gig.name,
        gig.venue
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bandbook_core::model::SongDuration;

    #[test]
    fn test_song_line_shows_duration() {
        let song = Song::new("Title", "Artist")
            .with_id("s1")
            .with_duration(SongDuration::from_secs(245));
        let line = song_line(&song);
        assert!(line.starts_with("s1"));
        assert!(line.contains("4:05"));
        assert!(line.contains("Title - Artist"));
    }

    #[test]
    fn test_song_line_without_duration() {
        let song = Song::new("Title", "Artist").with_id("s1");
        assert!(song_line(&song).contains("-:--"));
    }

    #[test]
    fn test_status_markers_are_distinct() {
        let markers = [
            status_marker(DateStatus::Full),
            status_marker(DateStatus::Partial),
            status_marker(DateStatus::Conflict),
            status_marker(DateStatus::Unknown),
        ];
        for (i, a) in markers.iter().enumerate() {
            for b in &markers[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
