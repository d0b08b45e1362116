use anyhow::{bail, Result};
use bandbook_core::access::require_admin;
use bandbook_core::model::BandMember;

use super::Session;
use crate::output;

pub fn add(
    session: &Session,
    name: String,
    instrument: String,
    core: bool,
    user: Option<String>,
) -> Result<()> {
    require_admin(&session.principal)?;

    let mut member = BandMember::new(name, instrument);
    member.is_core = core;
    if let Some(user) = user {
        member = member.with_user(user);
    }
    session.store.insert(&member)?;
    log::info!("Added member {} ({})", member.id, member.name);

    if session.json {
        return output::print_json(&member);
    }
    println!(
        "✓ Added {} {} ({})",
        if member.is_core { "core member" } else { "replacement" },
        member.name,
        member.id
    );
    Ok(())
}

pub fn list(session: &Session) -> Result<()> {
    let members = session.store.members()?;
    if session.json {
        return output::print_json(&members);
    }
    if members.is_empty() {
        println!("No members yet. Add one with 'bandbook member add'.");
        return Ok(());
    }
    for member in &members {
        println!(
            "{:<16} {:<20} {:<12} {}",
            member.id.as_str(),
            member.name,
            member.instrument,
            if member.is_core { "core" } else { "replacement" }
        );
    }
    Ok(())
}

/// Availability answers and gig bookings that name the member are left in
/// place; the aggregator ignores answers from members not on the roster.
pub fn remove(session: &Session, id: &str) -> Result<()> {
    require_admin(&session.principal)?;
    if !session.store.delete::<BandMember>(id)? {
        bail!("No member with id {id}");
    }
    println!("✓ Removed member {id}");
    Ok(())
}
