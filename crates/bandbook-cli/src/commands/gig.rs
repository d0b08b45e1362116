use anyhow::{bail, Result};
use bandbook_core::access::{require_admin, require_core, sees_full_gig, visible_gigs};
use bandbook_core::model::{BandMember, Gig, GigStatus, Setlist, SetlistId};
use chrono::NaiveDate;

use super::Session;
use crate::output;

/// Load a gig the caller is allowed to see, redacted as for `gig list`.
fn visible_gig(session: &Session, id: &str) -> Result<Gig> {
    let gig: Gig = session.store.require(id)?;
    match visible_gigs(&session.principal, vec![gig]).pop() {
        Some(gig) => Ok(gig),
        None => bail!("Gig {id} is not visible to {}", session.principal.user_id),
    }
}

pub fn add(
    session: &Session,
    name: String,
    date: NaiveDate,
    venue: String,
    status: Option<GigStatus>,
) -> Result<()> {
    require_admin(&session.principal)?;

    let gig = Gig::new(name, date, venue).with_status(status.unwrap_or_default());
    session.store.insert(&gig)?;
    log::info!("Added gig {} ({} on {})", gig.id, gig.name, gig.date);

    if session.json {
        return output::print_json(&gig);
    }
    println!("✓ Added {}", output::gig_line(&gig));
    Ok(())
}

pub fn list(session: &Session) -> Result<()> {
    let mut gigs = visible_gigs(&session.principal, session.store.list::<Gig>()?);
    gigs.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.name.cmp(&b.name)));

    if session.json {
        return output::print_json(&gigs);
    }
    if gigs.is_empty() {
        println!("No gigs.");
        return Ok(());
    }
    for gig in &gigs {
        println!("{}", output::gig_line(gig));
    }
    Ok(())
}

pub fn show(session: &Session, id: &str) -> Result<()> {
    let gig = visible_gig(session, id)?;
    if session.json {
        return output::print_json(&gig);
    }

    println!("{}", gig.name);
    println!("  date:    {}", gig.date);
    println!("  venue:   {}", gig.venue);
    println!("  status:  {}", gig.status);

    if !gig.lineup.is_empty() {
        println!("\n  Lineup:");
        for slot in &gig.lineup {
            let name = session
                .store
                .get::<BandMember>(slot.member_id.as_str())?
                .map_or_else(|| slot.member_id.to_string(), |m| m.name);
            let marker = if slot.is_replacement { " (replacement)" } else { "" };
            println!("    {name:<20} {}{marker}", slot.instrument);
        }
    }

    if !gig.set_ids.is_empty() {
        let catalog = session.store.catalog()?;
        for set_id in &gig.set_ids {
            let Some(setlist) = session.store.get::<Setlist>(set_id.as_str())? else {
                log::debug!("Gig {} lists missing setlist {set_id}", gig.id);
                continue;
            };
            println!("\n  Set: {}", setlist.name);
            output::print_assembled(&setlist.hydrate(&catalog));
        }
    }

    if sees_full_gig(&session.principal) && !gig.comments.is_empty() {
        println!("\n  Comments:");
        for comment in &gig.comments {
            println!(
                "    [{}] {}: {}",
                comment.created_at.format("%Y-%m-%d %H:%M"),
                comment.author,
                comment.text
            );
        }
    }
    Ok(())
}

pub fn set_status(session: &Session, id: &str, status: GigStatus) -> Result<()> {
    require_admin(&session.principal)?;
    let gig = session.store.modify::<Gig, _>(id, |gig| {
        gig.status = status;
        gig.touch();
        Ok(())
    })?;
    println!("✓ {}", output::gig_line(&gig));
    Ok(())
}

pub fn book(
    session: &Session,
    id: &str,
    member: String,
    instrument: String,
    replacement: bool,
) -> Result<()> {
    require_admin(&session.principal)?;
    let player: BandMember = session.store.require(&member)?;
    if player.is_core && replacement {
        log::warn!("{} is a core member but is booked as a replacement", player.name);
    }

    session.store.modify::<Gig, _>(id, |gig| {
        gig.book(player.id.clone(), instrument, replacement);
        gig.touch();
        Ok(())
    })?;
    println!("✓ Booked {} for {id}", player.name);
    Ok(())
}

pub fn attach(session: &Session, id: &str, setlist: &str) -> Result<()> {
    require_core(&session.principal)?;
    let set: Setlist = session.store.require(setlist)?;
    let set_id: SetlistId = set.id.clone();

    let mut attached = false;
    session.store.modify::<Gig, _>(id, |gig| {
        if !gig.set_ids.contains(&set_id) {
            gig.set_ids.push(set_id.clone());
            gig.touch();
            attached = true;
        }
        Ok(())
    })?;
    if attached {
        println!("✓ Attached {} to {id}", set.name);
    } else {
        println!("{} is already attached to {id}", set.name);
    }
    Ok(())
}

pub fn comment(session: &Session, id: &str, text: String) -> Result<()> {
    require_core(&session.principal)?;
    let author = session
        .principal
        .member
        .as_ref()
        .map_or_else(|| session.principal.user_id.to_string(), |m| m.name.clone());

    session.store.modify::<Gig, _>(id, |gig| {
        gig.add_comment(author, text);
        Ok(())
    })?;
    println!("✓ Comment added to {id}");
    Ok(())
}

pub fn remove(session: &Session, id: &str) -> Result<()> {
    require_admin(&session.principal)?;
    if !session.store.delete::<Gig>(id)? {
        bail!("No gig with id {id}");
    }
    println!("✓ Removed gig {id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bandbook_core::access::Principal;
    use bandbook_core::store::Store;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 20).unwrap()
    }

    fn store_with_gigs() -> Store {
        let store = Store::open_in_memory().unwrap();
        store
            .insert(&BandMember::new("Rikke", "vocals").with_id("m-core").core())
            .unwrap();
        store
            .insert(&BandMember::new("Sub", "drums").with_id("m-sub"))
            .unwrap();
        store
            .insert(&Gig::new("Booked", date(), "Hall").with_id("g1"))
            .unwrap();
        store
            .insert(&Gig::new("Other", date(), "Pub").with_id("g2"))
            .unwrap();
        store
    }

    #[test]
    fn test_booking_and_visibility() {
        let admin = Session::with_store(store_with_gigs(), Principal::admin("a"));
        book(&admin, "g1", "m-sub".to_string(), "drums".to_string(), true).unwrap();
        comment(&admin, "g1", "fee agreed".to_string()).unwrap();

        let gig: Gig = admin.store.require("g1").unwrap();
        assert_eq!(gig.name, "Booked");
        assert_eq!(gig.lineup.len(), 1);
        assert!(gig.lineup[0].is_replacement);
        assert_eq!(gig.comments.len(), 1);

        let sub = BandMember::new("Sub", "drums").with_id("m-sub");
        let session = Session::with_store(admin.store, Principal::member("u-sub", sub));
        let seen = visible_gig(&session, "g1").unwrap();
        assert!(seen.comments.is_empty());
        assert!(visible_gig(&session, "g2").is_err());
        assert!(comment(&session, "g1", "hi".to_string()).is_err());
    }

    #[test]
    fn test_status_and_attach() {
        let session = Session::with_store(store_with_gigs(), Principal::admin("a"));
        set_status(&session, "g1", GigStatus::Confirmed).unwrap();

        let setlist = Setlist::new("Main").with_id("s1");
        session.store.insert(&setlist).unwrap();
        attach(&session, "g1", "s1").unwrap();
        attach(&session, "g1", "s1").unwrap();

        let gig: Gig = session.store.require("g1").unwrap();
        assert_eq!(gig.status, GigStatus::Confirmed);
        assert_eq!(gig.set_ids, vec![SetlistId::from("s1")]);
        assert!(attach(&session, "g1", "missing").is_err());
    }
}
