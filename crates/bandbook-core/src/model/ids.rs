use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Generate a fresh record id: millisecond timestamp plus a random suffix.
fn generate() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}{}", Utc::now().timestamp_millis(), &suffix[..8])
}

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn new() -> Self {
                Self(generate())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(SongId, "Unique identifier for a song in the catalog.");
define_id!(MemberId, "Unique identifier for a band member.");
define_id!(SetlistId, "Unique identifier for a setlist.");
define_id!(GigId, "Unique identifier for a gig.");
define_id!(UserId, "Unique identifier for a login account.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_song_id_generation() {
        let id1 = SongId::new();
        let id2 = SongId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_generated_id_has_timestamp_prefix_and_suffix() {
        let before = Utc::now().timestamp_millis().to_string();
        let id = MemberId::new();
        assert_eq!(id.as_str().len(), before.len() + 8);
        assert!(id.as_str()[..before.len()].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_id_from_str_is_verbatim() {
        let id = SongId::from("A");
        assert_eq!(id.as_str(), "A");
        assert_eq!(id.to_string(), "A");
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = GigId::from("gig-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"gig-1\"");
        let back: GigId = serde_json::from_str("\"gig-1\"").unwrap();
        assert_eq!(back, id);
    }
}
