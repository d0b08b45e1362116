use std::collections::HashMap;

use anyhow::{anyhow, Result};
use bandbook_core::access::require_self_or_admin;
use bandbook_core::availability::{core_roster, day_overview, month_overview, DateStatus};
use bandbook_core::model::{AvailabilityEntry, AvailabilityStatus, BandMember, DayKey, MemberId};

use super::Session;
use crate::output;

/// Member display names keyed by id, falling back to the id itself.
fn name_lookup(members: &[BandMember]) -> impl Fn(&str) -> String + '_ {
    let names: HashMap<&str, &str> = members
        .iter()
        .map(|m| (m.id.as_str(), m.name.as_str()))
        .collect();
    move |id: &str| names.get(id).map_or_else(|| id.to_string(), |n| (*n).to_string())
}

pub fn set(
    session: &Session,
    day: DayKey,
    status: AvailabilityStatus,
    member: Option<String>,
    comment: Option<String>,
) -> Result<()> {
    let member_id: MemberId = match member {
        Some(id) => id.into(),
        None => session
            .principal
            .member_id()
            .cloned()
            .ok_or_else(|| anyhow!("No member to answer for; pass --member <id>"))?,
    };
    require_self_or_admin(&session.principal, &member_id)?;

    let member: BandMember = session.store.require(member_id.as_str())?;
    if !member.is_core {
        log::warn!(
            "{} is not a core member; the answer is stored but does not affect date status",
            member.name
        );
    }

    let mut entry = AvailabilityEntry::new(day, member_id, status);
    if let Some(comment) = comment {
        entry = entry.with_comment(comment);
    }
    session.store.set_availability(&entry)?;

    if session.json {
        return output::print_json(&entry);
    }
    println!("✓ {} is {} on {}", member.name, status, day);
    Ok(())
}

/// Every member, plus the core roster the aggregator counts.
fn roster(session: &Session) -> Result<(Vec<BandMember>, Vec<BandMember>)> {
    let members = session.store.members()?;
    let core = core_roster(&members);
    Ok((members, core))
}

pub fn day(session: &Session, day: DayKey) -> Result<()> {
    let (members, core) = roster(session)?;
    let entries = session.store.entries_for_day(day)?;
    let overview = day_overview(day, &core, &entries);

    if session.json {
        return output::print_json(&overview);
    }
    let names = name_lookup(&members);
    output::print_day(&overview, &names);
    for entry in &entries {
        if let Some(comment) = &entry.comment {
            println!("    note from {}: {comment}", names(entry.member_id.as_str()));
        }
    }
    Ok(())
}

pub fn month(session: &Session, year: i32, month: u32) -> Result<()> {
    let (_, core) = roster(session)?;
    let entries = session.store.list::<AvailabilityEntry>()?;
    let overview = month_overview(year, month, &core, &entries)?;

    if session.json {
        return output::print_json(&overview);
    }

    println!("{year}-{month:02}  ({} core member(s))", core.len());
    let mut counts: HashMap<DateStatus, usize> = HashMap::new();
    for day in &overview {
        *counts.entry(day.status).or_default() += 1;
        println!(
            "  {} {}  {}",
            output::status_marker(day.status),
            day.day,
            day.status
        );
    }
    println!();
    for status in [
        DateStatus::Full,
        DateStatus::Partial,
        DateStatus::Conflict,
        DateStatus::Unknown,
    ] {
        println!("  {:<9} {}", status.to_string(), counts.get(&status).copied().unwrap_or(0));
    }
    Ok(())
}
