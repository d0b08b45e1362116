pub mod avail;
pub mod config;
pub mod gig;
pub mod member;
pub mod set;
pub mod song;
pub mod status;
pub mod suggest;

use anyhow::{Context, Result};
use bandbook_ai::Config;
use bandbook_core::access::Principal;
use bandbook_core::model::BandMember;
use bandbook_core::store::Store;

/// User id of the operator when no `--as` member is given.
const LOCAL_ADMIN: &str = "local-admin";

/// Everything a command needs: the open store, who is asking, and how to print.
#[derive(Debug)]
pub struct Session {
    pub store: Store,
    pub principal: Principal,
    pub config: Config,
    pub json: bool,
}

impl Session {
    /// Open the configured database and resolve the acting principal.
    pub fn open(config: Config, as_member: Option<&str>, json: bool) -> Result<Self> {
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create database directory")?;
        }
        let store = Store::open(&config.database_path).with_context(|| {
            format!("Failed to open database {}", config.database_path.display())
        })?;

        let principal = match as_member {
            Some(id) => {
                let member: BandMember = store
                    .require(id)
                    .with_context(|| format!("Unknown member {id}"))?;
                let user_id = member
                    .user_id
                    .clone()
                    .unwrap_or_else(|| format!("member:{}", member.id).into());
                Principal::member(user_id, member)
            }
            None => Principal::admin(LOCAL_ADMIN),
        };
        log::debug!(
            "Session for {} (admin: {})",
            principal.user_id,
            principal.is_admin
        );

        Ok(Self {
            store,
            principal,
            config,
            json,
        })
    }

    /// Open an existing store directly (tests).
    #[cfg(test)]
    pub fn with_store(store: Store, principal: Principal) -> Self {
        Self {
            store,
            principal,
            config: Config::default(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_session_defaults_to_admin() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            database_path: dir.path().join("nested").join("band.db"),
            ..Config::default()
        };
        let session = Session::open(config, None, false).unwrap();
        assert!(session.principal.is_admin);
        assert!(dir.path().join("nested").join("band.db").exists());
    }

    #[test]
    fn test_session_as_member() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            database_path: dir.path().join("band.db"),
            ..Config::default()
        };
        {
            let store = Store::open(&config.database_path).unwrap();
            store
                .insert(&BandMember::new("Rikke", "vocals").with_id("m1").core())
                .unwrap();
        }
        let session = Session::open(config.clone(), Some("m1"), false).unwrap();
        assert!(!session.principal.is_admin);
        assert!(session.principal.is_core());
        assert_eq!(session.principal.user_id.as_str(), "member:m1");

        assert!(Session::open(config, Some("nobody"), false).is_err());
    }
}
