//! Capability checks for callers.
//!
//! Every operation that needs a role calls one of the guard functions here
//! instead of re-deriving the rule inline. How a caller proves who they are
//! (sessions, tokens) is up to the surface in front of the core.

use crate::error::{Error, Result};
use crate::model::{BandMember, Gig, MemberId, UserId};

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub user_id: UserId,
    pub is_admin: bool,
    /// Band member linked to the account, if any.
    pub member: Option<BandMember>,
}

impl Principal {
    #[must_use]
    pub fn admin(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            is_admin: true,
            member: None,
        }
    }

    #[must_use]
    pub fn member(user_id: impl Into<UserId>, member: BandMember) -> Self {
        Self {
            user_id: user_id.into(),
            is_admin: false,
            member: Some(member),
        }
    }

    #[must_use]
    pub fn is_core(&self) -> bool {
        self.member.as_ref().is_some_and(|m| m.is_core)
    }

    #[must_use]
    pub fn member_id(&self) -> Option<&MemberId> {
        self.member.as_ref().map(|m| &m.id)
    }
}

pub fn require_admin(principal: &Principal) -> Result<()> {
    if principal.is_admin {
        Ok(())
    } else {
        Err(Error::Forbidden(format!("{} is not an administrator", principal.user_id)))
    }
}

/// Admins pass as well.
pub fn require_core(principal: &Principal) -> Result<()> {
    if principal.is_admin || principal.is_core() {
        Ok(())
    } else {
        Err(Error::Forbidden(format!("{} is not a core member", principal.user_id)))
    }
}

/// Members may only act on their own records unless they are admins.
pub fn require_self_or_admin(principal: &Principal, member_id: &MemberId) -> Result<()> {
    if principal.is_admin || principal.member_id() == Some(member_id) {
        Ok(())
    } else {
        Err(Error::Forbidden(format!(
            "{} may not act on behalf of member {member_id}",
            principal.user_id
        )))
    }
}

/// Whether the caller sees the gig's internal details (comment thread).
#[must_use]
pub fn sees_full_gig(principal: &Principal) -> bool {
    principal.is_admin || principal.is_core()
}

/// The gigs a caller may see.
///
/// Admins and core members see everything. Replacement members only see
/// gigs they are booked for, without the comment thread.
#[must_use]
pub fn visible_gigs(principal: &Principal, gigs: Vec<Gig>) -> Vec<Gig> {
    if sees_full_gig(principal) {
        return gigs;
    }
    let Some(member_id) = principal.member_id() else {
        return Vec::new();
    };
    gigs.into_iter()
        .filter(|g| g.features(member_id))
        .map(|mut g| {
            g.comments.clear();
            g
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn core_member() -> Principal {
        Principal::member("u-core", BandMember::new("Rikke", "vocals").with_id("m-core").core())
    }

    fn replacement() -> Principal {
        Principal::member("u-sub", BandMember::new("Sub", "drums").with_id("m-sub"))
    }

    fn gigs() -> Vec<Gig> {
        let date = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        let mut booked = Gig::new("Booked", date, "Town Hall")
            .with_id("g1")
            .with_player("m-core", "vocals", false)
            .with_player("m-sub", "drums", true);
        booked.add_comment("Rikke", "fee agreed");
        let other = Gig::new("Other", date, "Pub").with_id("g2").with_player("m-core", "vocals", false);
        vec![booked, other]
    }

    #[test]
    fn test_require_admin() {
        assert!(require_admin(&Principal::admin("root")).is_ok());
        assert!(matches!(require_admin(&core_member()), Err(Error::Forbidden(_))));
    }

    #[test]
    fn test_require_core() {
        assert!(require_core(&Principal::admin("root")).is_ok());
        assert!(require_core(&core_member()).is_ok());
        assert!(require_core(&replacement()).is_err());
    }

    #[test]
    fn test_require_self_or_admin() {
        let me = core_member();
        assert!(require_self_or_admin(&me, &MemberId::from("m-core")).is_ok());
        assert!(require_self_or_admin(&me, &MemberId::from("m-sub")).is_err());
        assert!(require_self_or_admin(&Principal::admin("root"), &MemberId::from("m-sub")).is_ok());
    }

    #[test]
    fn test_core_member_sees_all_gigs_with_comments() {
        let visible = visible_gigs(&core_member(), gigs());
        assert_eq!(visible.len(), 2);
        assert_eq!(visible[0].comments.len(), 1);
    }

    #[test]
    fn test_replacement_sees_only_booked_gigs_without_comments() {
        let visible = visible_gigs(&replacement(), gigs());
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id.as_str(), "g1");
        assert!(visible[0].comments.is_empty());
    }

    #[test]
    fn test_account_without_member_sees_nothing() {
        let nobody = Principal {
            user_id: UserId::from("u-x"),
            is_admin: false,
            member: None,
        };
        assert!(visible_gigs(&nobody, gigs()).is_empty());
    }
}
