use anyhow::Result;
use bandbook_core::access::visible_gigs;
use bandbook_core::availability::{core_roster, day_overview, DateStatus};
use bandbook_core::model::{
    AvailabilityEntry, BandMember, DayKey, Gig, GigStatus, Setlist, Song,
};
use chrono::Local;

use super::Session;

pub fn show_status(session: &Session) -> Result<()> {
    let store = &session.store;
    let members: Vec<BandMember> = store.members()?;
    let core = core_roster(&members);

    println!("\n🎸 Bandbook Status\n");
    println!("  Database:  {}", session.config.database_path.display());
    println!("  Acting as: {}", session.principal.user_id);
    println!("  Songs:     {}", store.count::<Song>()?);
    println!("  Setlists:  {}", store.count::<Setlist>()?);
    println!("  Members:   {} ({} core)", members.len(), core.len());
    println!("  Answers:   {}", store.count::<AvailabilityEntry>()?);

    let today = Local::now().date_naive();
    let mut upcoming: Vec<Gig> = visible_gigs(&session.principal, store.list::<Gig>()?)
        .into_iter()
        .filter(|g| g.date >= today && g.status != GigStatus::Canceled)
        .collect();
    upcoming.sort_by_key(|g| g.date);

    if upcoming.is_empty() {
        println!("\n  No upcoming gigs.");
        return Ok(());
    }

    println!("\n  Upcoming gigs:");
    for gig in &upcoming {
        let day = DayKey::from_date(gig.date);
        let status = day_overview(day, &core, &store.entries_for_day(day)?).status;
        println!(
            "    {}  {:<10} {} @ {}  (band: {status})",
            gig.date,
            gig.status.to_string(),
            gig.name,
            gig.venue
        );
        if status == DateStatus::Unknown {
            println!("        not every core member has answered for {day}");
        }
    }

    Ok(())
}
